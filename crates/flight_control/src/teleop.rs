//! Interactive keyboard flight
//!
//! Reads one token per line and turns it into a short velocity command. The
//! vehicle is staged the same way as the sequencer before the first prompt,
//! and landed, disarmed and released whichever way the loop ends.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument, warn};
use vehicle_client::VehicleClient;

use crate::command::Commander;
use crate::error::{FlightError, Result, Stage};
use crate::keymap::{Token, HELP};
use crate::lease::CleanupReport;
use crate::plan::FlightPlan;
use crate::shutdown::Shutdown;
use crate::staging;

const PROMPT: &[u8] = b"Command: ";
const UNKNOWN_NOTICE: &[u8] = b"Unknown command.\n";

/// Why the loop stopped
#[derive(Debug)]
pub enum Termination {
    /// `exit` typed
    Exit,
    /// Input closed
    EndOfInput,
    /// Shutdown requested while waiting for input
    Interrupted,
    /// Reading input or writing the prompt failed
    Io(std::io::Error),
    /// Staging or a dispatched command failed
    Aborted(FlightError),
}

/// Teleop session summary
#[derive(Debug)]
pub struct TeleopReport {
    pub dispatched: usize,
    pub unknown: usize,
    pub termination: Termination,
    pub cleanup: CleanupReport,
}

#[derive(Debug, Default)]
struct Counts {
    dispatched: usize,
    unknown: usize,
}

/// Interactive command loop
pub struct Teleop<'a, C> {
    client: &'a mut C,
    plan: FlightPlan,
    shutdown: Shutdown<'a>,
}

impl<'a, C: VehicleClient> Teleop<'a, C> {
    pub fn new(client: &'a mut C, plan: FlightPlan) -> Self {
        Self {
            client,
            plan,
            shutdown: Shutdown::never(),
        }
    }

    /// End the loop at the next prompt once `signal` resolves
    pub fn with_shutdown(mut self, signal: impl Future<Output = ()> + Send + 'a) -> Self {
        self.shutdown = Shutdown::new(signal);
        self
    }

    /// Stage the vehicle, then dispatch tokens from `input` until `exit` or
    /// end of input
    ///
    /// # Errors
    /// `Connection` when the simulator could not be reached or control could
    /// not be taken. Everything later ends the loop and is reported.
    #[instrument(name = "teleop_run", skip_all, fields(vehicle = %self.plan.vehicle))]
    pub async fn run<R, W>(mut self, input: R, mut output: W) -> Result<TeleopReport>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut commander = Commander::new(self.plan.command_timeout);
        let lease = staging::take_control(&mut *self.client, &self.plan, &mut commander).await?;

        let mut counts = Counts::default();
        let termination = if self.shutdown.requested().await {
            Termination::Interrupted
        } else {
            match staging::launch(&*self.client, &self.plan, &mut commander).await {
                Ok(()) => {
                    self.command_loop(input, &mut output, &mut commander, &mut counts)
                        .await
                }
                Err(e) => Termination::Aborted(e),
            }
        };
        match &termination {
            Termination::Exit | Termination::EndOfInput => info!(?termination, "teleop finished"),
            Termination::Interrupted => warn!("teleop interrupted by shutdown request"),
            Termination::Io(e) => warn!(error = %e, "teleop input failed"),
            Termination::Aborted(e) => warn!(error = %e, "teleop aborted"),
        }

        let cleanup = lease.release(&*self.client, &mut commander).await;

        Ok(TeleopReport {
            dispatched: counts.dispatched,
            unknown: counts.unknown,
            termination,
            cleanup,
        })
    }

    async fn command_loop<R, W>(
        &mut self,
        input: R,
        output: &mut W,
        commander: &mut Commander,
        counts: &mut Counts,
    ) -> Termination
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Err(e) = write_flush(output, HELP.as_bytes()).await {
            return Termination::Io(e);
        }

        let mut lines = input.lines();
        loop {
            if let Err(e) = write_flush(output, PROMPT).await {
                return Termination::Io(e);
            }
            let read = tokio::select! {
                _ = self.shutdown.wait() => return Termination::Interrupted,
                read = lines.next_line() => read,
            };
            let line = match read {
                Ok(Some(line)) => line,
                Ok(None) => return Termination::EndOfInput,
                Err(e) => return Termination::Io(e),
            };

            let token = Token::parse(&line);
            match &token {
                Token::Exit => return Termination::Exit,
                Token::Unknown(token) => {
                    let notice = FlightError::UnknownInput {
                        token: token.clone(),
                    };
                    warn!(error = %notice, "ignored input");
                    counts.unknown += 1;
                    if let Err(e) = write_flush(output, UNKNOWN_NOTICE).await {
                        return Termination::Io(e);
                    }
                    continue;
                }
                Token::Move(_) | Token::Stop | Token::Blank => {}
            }
            let Some(command) = token.command() else {
                continue;
            };

            let dispatch = self.client.move_by_velocity(command, &self.plan.vehicle);
            if let Err(e) = commander.issue(Stage::Teleop, dispatch).await {
                return Termination::Aborted(e);
            }
            counts.dispatched += 1;
            observability::record_teleop_command(token.label());
        }
    }
}

async fn write_flush<W: AsyncWrite + Unpin>(output: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    output.write_all(bytes).await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MotionCommand, VelocityFrame, YawMode};
    use vehicle_client::{FaultPoint, MockCall, MockConfig, MockOp, MockVehicleClient};

    async fn drive(
        config: MockConfig,
        input: &str,
    ) -> (MockVehicleClient, Result<TeleopReport>, String) {
        let mut client = MockVehicleClient::with_config(config);
        let mut output = Vec::new();
        let result = Teleop::new(&mut client, FlightPlan::default())
            .run(input.as_bytes(), &mut output)
            .await;
        (client, result, String::from_utf8(output).unwrap())
    }

    fn moves(client: &MockVehicleClient) -> Vec<MotionCommand> {
        client
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::MoveByVelocity(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_mixed_tokens() {
        let (client, result, output) = drive(MockConfig::default(), "w\nz\nx\nexit\n").await;
        let report = result.unwrap();

        assert_eq!(report.dispatched, 2);
        assert_eq!(report.unknown, 1);
        assert!(matches!(report.termination, Termination::Exit));
        assert!(report.cleanup.is_clean());
        assert_eq!(output.matches("Unknown command.").count(), 1);
        assert!(output.starts_with("Controls:"));

        let moves = moves(&client);
        assert_eq!(
            moves[0],
            MotionCommand::world(1.0, 0.0, 0.0, YawMode::rate(0.0), 0.5)
        );
        assert_eq!(moves[1].frame, VelocityFrame::Body);
        assert!(moves[1].is_stop());
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_exit_dispatches_nothing() {
        let (client, result, _) = drive(MockConfig::default(), "exit\nw\n").await;
        let report = result.unwrap();

        assert_eq!(report.dispatched, 0);
        assert!(moves(&client).is_empty());
        assert_eq!(client.count(MockOp::DisableApiControl), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        let (client, result, output) = drive(MockConfig::default(), "  D \n\n\nl").await;
        let report = result.unwrap();

        assert!(matches!(report.termination, Termination::EndOfInput));
        assert_eq!(report.dispatched, 2);
        assert_eq!(report.unknown, 0);
        assert!(!output.contains("Unknown command."));
        assert_eq!(moves(&client)[1].yaw, YawMode::rate(30.0));
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_ends_loop() {
        let config = MockConfig {
            failures: vec![FaultPoint::nth(MockOp::MoveByVelocity, 1)],
            ..Default::default()
        };
        let (client, result, _) = drive(config, "w\ns\na\nexit\n").await;
        let report = result.unwrap();

        assert!(matches!(
            report.termination,
            Termination::Aborted(FlightError::CommandFailure {
                stage: Stage::Teleop,
                ..
            })
        ));
        assert_eq!(report.dispatched, 1);
        assert_eq!(client.count(MockOp::MoveByVelocity), 2);
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_takeoff_failure_skips_loop() {
        let config = MockConfig {
            failures: vec![FaultPoint::first(MockOp::Takeoff)],
            ..Default::default()
        };
        let (client, result, output) = drive(config, "w\nexit\n").await;
        let report = result.unwrap();

        assert!(matches!(report.termination, Termination::Aborted(_)));
        assert_eq!(report.dispatched, 0);
        assert!(output.is_empty());
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_shutdown_before_launch_still_releases() {
        let mut client = MockVehicleClient::new();
        let mut output = Vec::new();

        let report = Teleop::new(&mut client, FlightPlan::default())
            .with_shutdown(async {})
            .run(&b"w\nexit\n"[..], &mut output)
            .await
            .unwrap();

        assert!(matches!(report.termination, Termination::Interrupted));
        assert_eq!(report.dispatched, 0);
        assert!(output.is_empty());
        assert_eq!(client.count(MockOp::Arm), 0);
        assert_eq!(client.count(MockOp::Land), 1);
        assert_eq!(client.count(MockOp::DisableApiControl), 1);
    }

    #[tokio::test]
    async fn test_shutdown_at_prompt_ends_loop() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let (reader, mut writer) = tokio::io::duplex(64);
        let mut client = MockVehicleClient::new();
        let mut output = Vec::new();

        let teleop = Teleop::new(&mut client, FlightPlan::default()).with_shutdown(async move {
            let _ = rx.await;
        });
        let operator = async move {
            writer.write_all(b"w\n").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            tx.send(()).unwrap();
            writer
        };
        let (result, _writer) = tokio::join!(
            teleop.run(tokio::io::BufReader::new(reader), &mut output),
            operator
        );
        let report = result.unwrap();

        assert!(matches!(report.termination, Termination::Interrupted));
        assert_eq!(report.dispatched, 1);
        assert!(report.cleanup.is_clean());
        assert_eq!(client.count(MockOp::Land), 1);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = MockConfig {
            refuse_connection: true,
            ..Default::default()
        };
        let (client, result, _) = drive(config, "w\n").await;

        assert!(matches!(result, Err(FlightError::Connection { .. })));
        assert_eq!(client.count(MockOp::Land), 0);
    }
}
