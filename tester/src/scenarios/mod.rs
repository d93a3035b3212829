//! Test Scenarios
//!
//! Named groups runnable from the `tester` binary

pub mod edge;
pub mod with_stop;

use shared::component_info;
use supervisor::FixtureControl;

use crate::config::ScenarioConfig;
use crate::error::{TesterError, TesterResult};
use crate::runtime::TestGroup;
use crate::testing::GroupReport;

pub struct TestScenarios {
    config: ScenarioConfig,
}

impl TestScenarios {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Build the groups behind a scenario name
    pub fn build(&self, name: &str) -> TesterResult<Vec<TestGroup>> {
        let config = &self.config;
        match name {
            "with-stop" => Ok(vec![with_stop::with_stop(config)?]),
            "no-handle" => Ok(vec![edge::no_handle(config)?]),
            "stubborn" => Ok(vec![edge::stubborn(config)?]),
            "nested" => Ok(vec![edge::nested(config)?]),
            "all" => Ok(vec![
                with_stop::with_stop(config)?,
                edge::no_handle(config)?,
                edge::stubborn(config)?,
                edge::nested(config)?,
            ]),
            _ => Err(TesterError::UnknownScenario {
                name: name.to_string(),
                available: Self::available_scenarios().join(", "),
            }),
        }
    }

    /// Run a scenario's groups one after another
    pub async fn run_scenario(
        &self,
        name: &str,
        fixtures: &dyn FixtureControl,
    ) -> TesterResult<Vec<GroupReport>> {
        let groups = self.build(name)?;
        component_info!("🧪 Running scenario '{}' ({} group(s))", name, groups.len());

        let mut reports = Vec::with_capacity(groups.len());
        for group in &groups {
            reports.push(group.run(fixtures).await);
        }
        Ok(reports)
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        vec!["with-stop", "no-handle", "stubborn", "nested", "all"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scenario_lists_available() {
        let scenarios = TestScenarios::new(ScenarioConfig::default());
        match scenarios.build("missing") {
            Err(TesterError::UnknownScenario { name, available }) => {
                assert_eq!(name, "missing");
                assert!(available.contains("with-stop"));
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("unknown scenario should not build"),
        }
    }

    #[test]
    fn test_all_builds_every_group() {
        let scenarios = TestScenarios::new(ScenarioConfig::builder().port(0).build());
        let names: Vec<_> = scenarios
            .build("all")
            .unwrap()
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["with stop", "no handle", "stubborn", "nested"]);
    }
}
