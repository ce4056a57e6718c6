//! # Integration Tests
//!
//! Cross-crate end-to-end tests against the mock vehicle.
//!
//! Covers:
//! - Contract snapshot tests
//! - Config file -> sequencer -> file sink
//! - Failure injection and cleanup guarantees
//! - Teleop scripted sessions

#[cfg(test)]
mod contract_tests {
    use contracts::{default_regimes, RegimeTable};

    #[test]
    fn test_default_regime_table() {
        let table = RegimeTable::new(default_regimes()).unwrap();
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast"]);
        assert_eq!(table.total_captures(), 6);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::time::Duration;

    use capture_sink::{FileSink, LogSink};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::MissionBlueprint;
    use flight_control::{FlightError, FlightPlan, Sequencer, Stage, Teleop, Termination};
    use vehicle_client::{FaultPoint, MockConfig, MockOp, MockVehicleClient};

    fn blueprint(output_dir: &Path, extra: &str) -> MissionBlueprint {
        let content = format!(
            r#"
[vehicle]
name = "Drone1"
camera = "front_center"

[capture]
output_dir = "{}"
{extra}
"#,
            output_dir.display().to_string().replace('\\', "/")
        );
        ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap()
    }

    fn png_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    /// End-to-end test: config -> Sequencer -> FileSink
    ///
    /// The stock slow/fast table yields two reconfigurations, two moves and
    /// six PNG files named after regime, index and resolution.
    #[tokio::test]
    async fn test_e2e_slow_fast_mission() {
        let dir = tempfile::tempdir().unwrap();
        let bp = blueprint(dir.path(), "");
        let table = bp.regime_table().unwrap();

        let mut client = MockVehicleClient::new();
        let mut sink = FileSink::new("file", &bp.capture.output_dir).unwrap();
        let report = Sequencer::new(&mut client, &mut sink, FlightPlan::from_blueprint(&bp))
            .run(&table)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(client.count(MockOp::SetCamera), 2);
        assert_eq!(client.count(MockOp::MoveByVelocity), 2);
        assert_eq!(client.count(MockOp::CaptureImage), 6);
        assert_eq!(
            png_names(dir.path()),
            vec![
                "fast_idx0_w320_h240.png",
                "fast_idx1_w320_h240.png",
                "fast_idx2_w320_h240.png",
                "slow_idx0_w640_h480.png",
                "slow_idx1_w640_h480.png",
                "slow_idx2_w640_h480.png",
            ]
        );

        let first = image::open(dir.path().join("slow_idx0_w640_h480.png")).unwrap();
        assert_eq!((first.width(), first.height()), (640, 480));
    }

    #[tokio::test]
    async fn test_e2e_custom_regimes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let bp = blueprint(
            dir.path(),
            r#"
[[regimes]]
name = "survey"
speed = 2.5
resolution = { width = 64, height = 48 }
fov_degrees = 60.0
capture_count = 2
move_duration_secs = 1.0
"#,
        );
        let table = bp.regime_table().unwrap();

        let mut client = MockVehicleClient::new();
        let mut sink = FileSink::new("file", &bp.capture.output_dir).unwrap();
        let report = Sequencer::new(&mut client, &mut sink, FlightPlan::from_blueprint(&bp))
            .run(&table)
            .await
            .unwrap();

        assert_eq!(report.saved(), 2);
        assert_eq!(
            png_names(dir.path()),
            vec!["survey_idx0_w64_h48.png", "survey_idx1_w64_h48.png"]
        );
    }

    #[tokio::test]
    async fn test_e2e_takeoff_failure() {
        let bp = MissionBlueprint::default();
        let table = bp.regime_table().unwrap();
        let mut client = MockVehicleClient::with_config(MockConfig {
            failures: vec![FaultPoint::first(MockOp::Takeoff)],
            ..Default::default()
        });
        let mut sink = LogSink::new("log");

        let report = Sequencer::new(&mut client, &mut sink, FlightPlan::from_blueprint(&bp))
            .run(&table)
            .await
            .unwrap();

        assert_eq!(report.regimes_completed(), 0);
        assert_eq!(sink.seen(), 0);
        assert!(matches!(
            report.abort,
            Some(FlightError::CommandFailure {
                stage: Stage::Takeoff,
                ..
            })
        ));
        assert_eq!(client.count(MockOp::Land), 1);
        assert_eq!(client.count(MockOp::Disarm), 1);
        assert_eq!(client.count(MockOp::DisableApiControl), 1);
        assert!(!client.is_armed());
        assert!(!client.api_control_enabled());
    }

    #[tokio::test]
    async fn test_e2e_capture_misses_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let bp = blueprint(dir.path(), "");
        let table = bp.regime_table().unwrap();
        let mut client = MockVehicleClient::with_config(MockConfig {
            empty_captures: vec![1, 4],
            ..Default::default()
        });
        let mut sink = FileSink::new("file", &bp.capture.output_dir).unwrap();

        let report = Sequencer::new(&mut client, &mut sink, FlightPlan::from_blueprint(&bp))
            .run(&table)
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.saved(), 4);
        assert_eq!(report.missed(), 2);
        assert_eq!(sink.written(), 4);
        assert!(!dir.path().join("slow_idx1_w640_h480.png").exists());
    }

    #[tokio::test]
    async fn test_e2e_hung_command_times_out() {
        let bp = MissionBlueprint::default();
        let table = bp.regime_table().unwrap();
        let mut client = MockVehicleClient::with_config(MockConfig {
            hangs: vec![FaultPoint::first(MockOp::SetCamera)],
            ..Default::default()
        });
        let mut sink = LogSink::new("log");
        let plan = FlightPlan::from_blueprint(&bp).with_command_timeout(Some(Duration::from_millis(100)));

        let report = Sequencer::new(&mut client, &mut sink, plan)
            .run(&table)
            .await
            .unwrap();

        assert!(matches!(
            report.abort,
            Some(FlightError::Timeout {
                stage: Stage::Reconfigure,
                ..
            })
        ));
        assert!(report.cleanup.is_clean());
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_e2e_unreachable_simulator() {
        let bp = MissionBlueprint::default();
        let table = bp.regime_table().unwrap();
        let mut client = MockVehicleClient::with_config(MockConfig {
            refuse_connection: true,
            ..Default::default()
        });
        let mut sink = LogSink::new("log");

        let result = Sequencer::new(&mut client, &mut sink, FlightPlan::from_blueprint(&bp))
            .run(&table)
            .await;

        assert!(matches!(result, Err(FlightError::Connection { .. })));
        assert_eq!(client.count(MockOp::Land), 0);
        assert_eq!(client.count(MockOp::Arm), 0);
    }

    /// Scripted teleop: one move, one unknown token, one stop, then exit
    #[tokio::test]
    async fn test_e2e_teleop_script() {
        let mut client = MockVehicleClient::new();
        let mut output = Vec::new();

        let report = Teleop::new(&mut client, FlightPlan::default())
            .run(&b"w\nz\nx\nexit\n"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(report.dispatched, 2);
        assert_eq!(report.unknown, 1);
        assert!(matches!(report.termination, Termination::Exit));
        assert!(report.cleanup.is_clean());

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Unknown command.").count(), 1);
        assert_eq!(output.matches("Command: ").count(), 4);
        assert_eq!(client.count(MockOp::MoveByVelocity), 2);
        assert_eq!(client.count(MockOp::Land), 1);
    }
}
