use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use shared::client::ProductSource;
use shared::listing::PriceRange;
use shared::session::{ListingEvent, ListingSession};
use strum_macros::{Display, EnumString};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::render;

const HELP: &str = "\
Commands:
  search [text]        search by product name, empty clears
  store [slug]         filter by supermarket, empty clears
  category [name]      filter by category, empty clears
  price <min> <max>    filter by euro price, 0 to 100
  reset                clear store, category and price filters
  page <n>             go to page n
  next | prev          move one page
  help                 show this help
  quit                 leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
enum Keyword {
    Search,
    Store,
    Category,
    Price,
    Reset,
    Page,
    Next,
    #[strum(serialize = "prev", serialize = "previous")]
    Prev,
    Help,
    #[strum(serialize = "quit", serialize = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Event(ListingEvent),
    Help,
    Quit,
}

/// Parses one line of interactive input. Blank lines yield `None`.
pub fn parse_input(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };
    if keyword.is_empty() {
        return Ok(None);
    }

    let keyword = Keyword::from_str(&keyword.to_lowercase())
        .map_err(|_| anyhow!("Unknown command: {}", keyword))?;

    let input = match keyword {
        Keyword::Search => Input::Event(ListingEvent::Search(rest.to_string())),
        Keyword::Store => Input::Event(ListingEvent::Store(rest.to_string())),
        Keyword::Category => {
            Input::Event(ListingEvent::Category(rest.to_string()))
        }
        Keyword::Price => {
            let (min, max) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("Usage: price <min> <max>"))?;
            let min = min.trim().parse::<u32>().context("Invalid min price")?;
            let max = max.trim().parse::<u32>().context("Invalid max price")?;
            Input::Event(ListingEvent::PriceRange(PriceRange::new(min, max)?))
        }
        Keyword::Reset => Input::Event(ListingEvent::ResetFilters),
        Keyword::Page => {
            let page = rest.parse::<u64>().context("Usage: page <n>")?;
            Input::Event(ListingEvent::Page(page))
        }
        Keyword::Next => Input::Event(ListingEvent::NextPage),
        Keyword::Prev => Input::Event(ListingEvent::PreviousPage),
        Keyword::Help => Input::Help,
        Keyword::Quit => Input::Quit,
    };

    Ok(Some(input))
}

/// Drives a listing session from `input` line by line and writes the help,
/// input errors and every published view to `output`. Once input ends or
/// `quit` is read, the session publishes its last fetch and stops.
pub async fn interactive<S, R, W>(
    source: Arc<S>,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    S: ProductSource,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (handle, session) = ListingSession::spawn(source);
    let mut view = handle.subscribe();
    let mut handle = Some(handle);

    write_block(output, HELP).await?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line(), if handle.is_some() => {
                let Some(line) = line.context("Failed to read input")? else {
                    handle = None;
                    continue;
                };
                match parse_input(&line) {
                    Ok(None) => {}
                    Ok(Some(Input::Help)) => write_block(output, HELP).await?,
                    Ok(Some(Input::Quit)) => handle = None,
                    Ok(Some(Input::Event(event))) => {
                        let sent = match &handle {
                            Some(handle) => handle.send(event).await,
                            None => false,
                        };
                        if !sent {
                            tracing::warn!("Listing session stopped unexpectedly");
                            handle = None;
                        }
                    }
                    Err(error) => {
                        write_block(output, &format!("{:#}", error)).await?
                    }
                }
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                write_block(output, &render::listing(&current)).await?;
            }
        }
    }

    session.await.context("Listing session panicked")?;
    output.flush().await.context("Failed to write output")?;

    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(
    output: &mut W,
    text: &str,
) -> anyhow::Result<()> {
    output
        .write_all(format!("{}\n\n", text).as_bytes())
        .await
        .context("Failed to write output")
}
