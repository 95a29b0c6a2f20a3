//! Posture server: receives landmark detections over TCP and replies with
//! per-frame evaluations and session summaries.
//!
//! Usage: posture_server [config.toml]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};

use posture_coach::analysis::{evaluate_frame, PostureType};
use posture_coach::config::Config;
use posture_coach::log;
use posture_coach::logging::{open_log_file, LogFile};
use posture_coach::protocol::{self, ClientMessage, ServerMessage};
use posture_coach::session::SessionRecorder;

const CONFIG_PATH: &str = "posture.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);
    let logfile = open_log_file(&config.log.dir, "server")?;

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    log!(logfile, "server", "listening on {}", config.server.listen_addr);
    log!(logfile, "server", "max frame length: {} bytes, verbose: {}", config.server.max_frame_length, config.log.verbose);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log!(logfile, "tcp", "accept error: {}", e);
                        continue;
                    }
                };
                let logfile = Arc::clone(&logfile);
                let max_frame_length = config.server.max_frame_length;
                let verbose = config.log.verbose;
                tokio::spawn(async move {
                    log!(logfile, peer, "connected");
                    match handle_connection(socket, peer, max_frame_length, verbose, &logfile).await {
                        Ok(()) => log!(logfile, peer, "disconnected"),
                        Err(e) => log!(logfile, peer, "connection error: {:#}", e),
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                log!(logfile, "server", "shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(
    socket: TcpStream,
    peer: SocketAddr,
    max_frame_length: usize,
    verbose: bool,
    logfile: &LogFile,
) -> Result<()> {
    let mut stream = protocol::message_stream(socket, max_frame_length);
    let mut session: Option<SessionRecorder> = None;

    while let Some(msg) = protocol::recv_message::<_, ClientMessage>(&mut stream).await? {
        let reply = respond(&mut session, msg);
        match &reply {
            ServerMessage::Error { message } => log!(logfile, peer, "{}", message),
            ServerMessage::SessionStarted { posture_type } => {
                log!(logfile, peer, "session started ({})", posture_type)
            }
            ServerMessage::SessionSummary { summary } => log!(
                logfile,
                peer,
                "session ended: {} frames, avg {}, {}",
                summary.frame_count, summary.average_score, summary.overall_rating
            ),
            ServerMessage::FrameResult { outcome }
            | ServerMessage::SessionFrameResult { outcome, .. } => {
                if verbose {
                    match &outcome.analysis {
                        Some(a) => log!(logfile, peer, "{} score={} issues={:?}", a.posture_type, a.score, a.issues),
                        None => log!(logfile, peer, "frame failed: {}", outcome.error.as_deref().unwrap_or("")),
                    }
                }
            }
        }
        protocol::send_message(&mut stream, &reply).await?;
    }

    if let Some(recorder) = session {
        log!(
            logfile,
            peer,
            "{} session abandoned after {} frames ({} without pose)",
            recorder.posture_type(),
            recorder.frame_count(),
            recorder.failed_frames()
        );
    }
    Ok(())
}

fn respond(session: &mut Option<SessionRecorder>, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::AnalyzeFrame { posture_type, detection } => ServerMessage::FrameResult {
            outcome: evaluate_frame(&detection, &posture_type),
        },
        ClientMessage::StartSession { posture_type } => match posture_type.parse::<PostureType>() {
            Ok(posture_type) => {
                *session = Some(SessionRecorder::streaming(posture_type));
                ServerMessage::SessionStarted { posture_type }
            }
            Err(e) => ServerMessage::Error { message: e.to_string() },
        },
        ClientMessage::SessionFrame { timestamp, detection } => match session.as_mut() {
            Some(recorder) => {
                let (frame_number, outcome) = recorder.record_next(timestamp, &detection);
                ServerMessage::SessionFrameResult { frame_number, outcome }
            }
            None => ServerMessage::Error { message: "no active session".to_string() },
        },
        ClientMessage::EndSession => match session.take() {
            Some(recorder) => match recorder.summarize() {
                Ok(summary) => ServerMessage::SessionSummary { summary },
                Err(e) => ServerMessage::Error { message: e.to_string() },
            },
            None => ServerMessage::Error { message: "no active session".to_string() },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_coach::pose::{Detection, Landmark, LandmarkIndex};
    use posture_coach::session::OverallRating;

    fn detection() -> Detection {
        Detection::found(vec![Landmark::at(0.5, 0.5); LandmarkIndex::COUNT])
    }

    #[test]
    fn test_analyze_frame_without_session() {
        let mut session = None;
        let reply = respond(
            &mut session,
            ClientMessage::AnalyzeFrame { posture_type: "yoga".to_string(), detection: detection() },
        );
        match reply {
            ServerMessage::FrameResult { outcome } => assert!(!outcome.success),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(session.is_none());
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = None;

        let reply = respond(&mut session, ClientMessage::StartSession { posture_type: "squat".to_string() });
        assert_eq!(reply, ServerMessage::SessionStarted { posture_type: PostureType::Squat });

        for i in 0..3 {
            let reply = respond(
                &mut session,
                ClientMessage::SessionFrame { timestamp: i as f64, detection: detection() },
            );
            match reply {
                ServerMessage::SessionFrameResult { frame_number, outcome } => {
                    assert_eq!(frame_number, i);
                    assert!(outcome.success);
                }
                other => panic!("unexpected reply: {:?}", other),
            }
        }

        match respond(&mut session, ClientMessage::EndSession) {
            ServerMessage::SessionSummary { summary } => {
                assert_eq!(summary.frame_count, 3);
                // 全点同一: 背中角度 0 で back_angle_poor のみ
                assert_eq!(summary.average_score, 75);
                assert_eq!(summary.overall_rating, OverallRating::Good);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(session.is_none());
    }

    #[test]
    fn test_session_errors() {
        let mut session = None;
        assert!(matches!(
            respond(&mut session, ClientMessage::StartSession { posture_type: "yoga".to_string() }),
            ServerMessage::Error { .. }
        ));
        assert!(matches!(
            respond(&mut session, ClientMessage::SessionFrame { timestamp: 0.0, detection: detection() }),
            ServerMessage::Error { .. }
        ));
        assert!(matches!(respond(&mut session, ClientMessage::EndSession), ServerMessage::Error { .. }));

        respond(&mut session, ClientMessage::StartSession { posture_type: "desk".to_string() });
        respond(&mut session, ClientMessage::SessionFrame { timestamp: 0.0, detection: Detection::none() });
        match respond(&mut session, ClientMessage::EndSession) {
            ServerMessage::Error { message } => assert!(message.contains("without analyzed frames")),
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
