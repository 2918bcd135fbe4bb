//! Interactive terminal mode: stdin lines in, relay replies out.

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info};

use ocrelay_channels::{Channel, CommandRouter, MessageFormat, OutboundMessage, TerminalChannel};
use ocrelay_client::OpenCodeApi;

/// Drive `channel` until end of input.
///
/// Lines that are not relay commands get a one-line hint instead of being
/// silently dropped.
pub async fn run<A, R, W>(
    router: &CommandRouter<A>,
    channel: &mut TerminalChannel<R, W>,
) -> anyhow::Result<()>
where
    A: OpenCodeApi,
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    channel.connect().await?;
    let word = router.dispatcher().command_word().to_string();
    info!(command = %word, "terminal channel ready");

    while let Some(inbound) = channel.next_message().await? {
        if router.deliver(&inbound, &*channel).await? {
            continue;
        }
        debug!("ignored non-command input");
        let hint = OutboundMessage::reply_to(
            &inbound,
            format!("Not a relay command. Try /{word}"),
            MessageFormat::PlainText,
        );
        channel.send(&hint).await?;
    }

    channel.disconnect().await?;
    info!("terminal channel closed");
    Ok(())
}
