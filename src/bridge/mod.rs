//! JSON-lines stdio front-end.
//!
//! Each stdin line is either a UI command (`{"type": ...}`) or a host event
//! (`{"hostEvent": ...}`). Every outbound message is written to stdout as one line.

mod host;

use std::io;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};

use crate::core::protocol::{HostEvent, Inbound, Outbound};
use crate::core::session::{Services, Session, SessionEvent};

pub use host::StdioHost;

/// Decode one input line into a session event.
pub fn parse_line(line: &str) -> Result<SessionEvent, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    if value.get("hostEvent").is_some() {
        Ok(serde_json::from_value::<HostEvent>(value)?.into())
    } else {
        Ok(serde_json::from_value::<Inbound>(value)?.into())
    }
}

async fn write_outbound<W: AsyncWrite + Unpin>(output: &mut W, msg: &Outbound) -> io::Result<()> {
    let mut line = serde_json::to_vec(msg).map_err(io::Error::other)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await
}

/// Run a session over the given streams until `input` reaches EOF and every
/// pending message has been written.
pub async fn serve<R, W>(services: Services, input: R, mut output: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = Session::new(services, out_tx.clone());
    let session_task = tokio::spawn(session.run(events_rx));

    let reader = async move {
        let mut lines = FramedRead::new(input, LinesCodec::new());
        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("failed to read input: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(event) => {
                    if events_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("ignoring malformed message: {}", e);
                    let _ = out_tx.send(Outbound::error(format!("Invalid message: {}", e)));
                }
            }
        }
        log::debug!("input closed");
    };

    let writer = async {
        while let Some(msg) = out_rx.recv().await {
            write_outbound(&mut output, &msg).await?;
        }
        Ok::<(), io::Error>(())
    };

    let ((), written) = tokio::join!(reader, writer);
    session_task.await.map_err(io::Error::other)?;
    written
}

/// Serve on the process's stdin and stdout.
pub async fn serve_stdio(services: Services) -> io::Result<()> {
    serve(services, tokio::io::stdin(), tokio::io::stdout()).await
}
