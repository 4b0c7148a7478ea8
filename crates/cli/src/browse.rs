//! Line-command driver for the interactive table.

use crate::render::{self, progress_bar};
use anyhow::{bail, Context};
use dash_core::constants::PAGE_SIZE_OPTIONS;
use dash_core::{Dashboard, LoadTicket, ResourceClient, ResourceSource, SortColumn};
use std::future::Future;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Rows moved by `down`/`up` without an argument.
const DEFAULT_SCROLL_ROWS: i64 = 10;

pub const HELP: &str = "\
Commands:
  search <text>     filter by patient, type, status, description or summary
  clear             clear the search
  next | prev       move one page
  page <n>          jump to page n
  size <n>          rows per page (25, 50, 100, 250, 500)
  sort <column>     sort by patient, type, status, created or fetched (again to reverse)
  down [rows]       scroll down within the page
  up [rows]         scroll up within the page
  top               scroll to the top of the page
  refresh [count]   load a new record set
  retry             retry after a failed load
  help              show this help
  quit              exit
Ctrl-C cancels a load in progress and quits at the prompt.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Clear,
    Next,
    Prev,
    Page(String),
    Size(usize),
    Sort(SortColumn),
    Down(i64),
    Up(i64),
    Top,
    Refresh(Option<usize>),
    Retry,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        Ok(match word.to_lowercase().as_str() {
            "search" | "/" => Command::Search(rest.to_string()),
            "clear" => Command::Clear,
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "page" | "g" => {
                if rest.is_empty() {
                    bail!("usage: page <number>");
                }
                Command::Page(rest.to_string())
            }
            "size" => {
                let size: usize = rest
                    .parse()
                    .with_context(|| format!("invalid page size '{rest}'"))?;
                if !PAGE_SIZE_OPTIONS.contains(&size) {
                    bail!("page size must be one of {PAGE_SIZE_OPTIONS:?}");
                }
                Command::Size(size)
            }
            "sort" => Command::Sort(rest.parse()?),
            "down" | "j" => Command::Down(scroll_rows(rest)?),
            "up" | "k" => Command::Up(scroll_rows(rest)?),
            "top" => Command::Top,
            "refresh" | "r" => Command::Refresh(if rest.is_empty() {
                None
            } else {
                Some(
                    rest.parse()
                        .with_context(|| format!("invalid record count '{rest}'"))?,
                )
            }),
            "retry" => Command::Retry,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}' (type 'help')"),
        })
    }
}

fn scroll_rows(rest: &str) -> anyhow::Result<i64> {
    if rest.is_empty() {
        return Ok(DEFAULT_SCROLL_ROWS);
    }
    rest.parse()
        .with_context(|| format!("invalid row count '{rest}'"))
}

/// What the driver should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Load(LoadTicket),
    Help,
    Ignored(&'static str),
    Quit,
}

pub fn apply(dash: &mut Dashboard, command: Command) -> anyhow::Result<Outcome> {
    Ok(match command {
        Command::Search(query) => {
            dash.set_query(query);
            Outcome::Redraw
        }
        Command::Clear => {
            dash.set_query("");
            Outcome::Redraw
        }
        Command::Next => {
            if !dash.next_page() {
                return Ok(Outcome::Ignored("already on the last page"));
            }
            Outcome::Redraw
        }
        Command::Prev => {
            if !dash.prev_page() {
                return Ok(Outcome::Ignored("already on the first page"));
            }
            Outcome::Redraw
        }
        Command::Page(input) => {
            if !dash.go_to_page(&input) {
                return Ok(Outcome::Ignored("page number must be numeric"));
            }
            Outcome::Redraw
        }
        Command::Size(size) => {
            dash.set_page_size(size)?;
            Outcome::Redraw
        }
        Command::Sort(column) => {
            dash.toggle_sort(column);
            Outcome::Redraw
        }
        Command::Down(rows) => {
            dash.scroll_rows(rows);
            Outcome::Redraw
        }
        Command::Up(rows) => {
            dash.scroll_rows(rows.saturating_neg());
            Outcome::Redraw
        }
        Command::Top => {
            dash.scroll_to(0);
            Outcome::Redraw
        }
        Command::Refresh(count) => match dash.refresh(count) {
            Some(ticket) => Outcome::Load(ticket),
            None => Outcome::Ignored("a load is already in progress"),
        },
        Command::Retry => match dash.retry() {
            Some(ticket) => Outcome::Load(ticket),
            None => Outcome::Ignored("nothing to retry"),
        },
        Command::Help => Outcome::Help,
        Command::Quit => Outcome::Quit,
    })
}

/// Run `ticket`'s load against `client`, feeding progress into the dashboard.
pub async fn load(client: &ResourceClient, dash: &mut Dashboard, ticket: LoadTicket) {
    let bar = progress_bar("Loading resource data");
    let result = {
        let mut on_progress = |percent: u8| {
            dash.report_progress(ticket, percent);
            bar.set_position(u64::from(percent));
        };
        let fetch = client.fetch(ticket.count(), &mut on_progress);
        tokio::pin!(fetch);
        tokio::select! {
            result = &mut fetch => result,
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::warn!("cancelling resource load");
                client.cancel();
                fetch.await
            }
        }
    };
    bar.finish_and_clear();
    dash.complete_load(ticket, result);
}

fn draw(dash: &Dashboard) {
    println!("{}\n", render::render(&dash.view()));
}

fn prompt() -> anyhow::Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

/// Load `count` records, then read commands from stdin until `quit`, Ctrl-C or end of input.
pub async fn run(client: &ResourceClient, dash: &mut Dashboard, count: usize) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    session(client, dash, count, stdin, || async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Browse loop over any line source. `interrupt` is called afresh for every prompt, so an
/// interrupt consumed by a load does not also end the session.
async fn session<R, F, Fut>(
    client: &ResourceClient,
    dash: &mut Dashboard,
    count: usize,
    input: R,
    mut interrupt: F,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tracing::info!(source = %client.kind(), count, "starting resource browser");

    let ticket = dash.begin_load(Some(count));
    load(client, dash, ticket).await;
    draw(dash);

    let mut lines = input.lines();
    loop {
        prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = interrupt() => {
                println!();
                tracing::info!("interrupted at prompt, leaving resource browser");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            draw(dash);
            continue;
        }

        let outcome = line
            .parse::<Command>()
            .and_then(|command| apply(dash, command));
        match outcome {
            Ok(Outcome::Redraw) => draw(dash),
            Ok(Outcome::Load(ticket)) => {
                load(client, dash, ticket).await;
                draw(dash);
            }
            Ok(Outcome::Help) => {
                println!("{HELP}");
                println!("Sortable columns: {}\n", render::sort_columns_hint());
            }
            Ok(Outcome::Ignored(reason)) => eprintln!("{reason}"),
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("{e:#}"),
        }
    }

    Ok(())
}
