use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::session::SearchSession;

/// Answers one query per input line with one JSON line, until EOF.
///
/// Mirrors the viewer's search box: every line is the full text typed so far.
pub async fn serve_lines<R, W>(session: &SearchSession, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim_end_matches('\r');
        let page = session.search(query);
        debug!(target: "docs_search_core", query, total = page.total, "answered query");

        let payload = serde_json::to_string(&page)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        answered += 1;
    }

    info!(target: "docs_search_core", answered, "input closed; leaving interactive search");
    Ok(answered)
}

/// Runs [`serve_lines`] over the process's stdin and stdout.
pub async fn serve_stdio(session: &SearchSession) -> Result<usize> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(session, stdin, tokio::io::stdout()).await
}
