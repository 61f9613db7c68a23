//! Interactive line-oriented browser

use anyhow::{Context, Result};
use postboard_sync::{BrowseSession, NewPost};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const HELP: &str = "\
Commands:
  search TEXT        filter authors by name (empty clears)
  select ID          show posts of an author
  clear              clear the author selection
  page N | next | prev
  star ID            toggle the star on a post
  open ID            show a post with its comments
  back               return to the previous screen
  starred            show starred posts
  new TITLE | BODY   create a post for the selected author
  retry              reload what is on screen
  help               show this help
  quit               leave";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Select(u64),
    Clear,
    Page(usize),
    Next,
    Prev,
    Star(u64),
    Open(u64),
    Back,
    Starred,
    New { title: String, body: String },
    Retry,
    Help,
    Quit,
}

fn parse_id(arg: &str, what: &str) -> Result<u64, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("{} expects a numeric id, got \"{}\"", what, arg.trim()))
}

/// Parse one line; `Ok(None)` for blank input
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word.to_lowercase().as_str() {
        "search" | "s" => Command::Search(rest.to_string()),
        "select" => Command::Select(parse_id(rest, "select")?),
        "clear" => Command::Clear,
        "page" => Command::Page(
            rest.parse()
                .map_err(|_| format!("page expects a number, got \"{}\"", rest))?,
        ),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "star" => Command::Star(parse_id(rest, "star")?),
        "open" => Command::Open(parse_id(rest, "open")?),
        "back" | "b" => Command::Back,
        "starred" => Command::Starred,
        "new" => {
            let (title, body) = rest
                .split_once('|')
                .ok_or_else(|| "usage: new TITLE | BODY".to_string())?;
            Command::New {
                title: title.trim().to_string(),
                body: body.trim().to_string(),
            }
        }
        "retry" | "r" => Command::Retry,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command \"{}\" (try help)", other)),
    };
    Ok(Some(command))
}

/// What the browser is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Authors,
    Posts,
    Detail,
    Starred,
}

struct Browser {
    session: BrowseSession,
    screens: Vec<Screen>,
}

impl Browser {
    fn new(session: BrowseSession) -> Self {
        let mut screens = vec![Screen::Authors];
        if session.selection().current_author_id().is_some() {
            screens.push(Screen::Posts);
        }
        if session.selection().current_post_id().is_some() {
            screens.push(Screen::Detail);
        }
        Self { session, screens }
    }

    fn screen(&self) -> Screen {
        self.screens.last().copied().unwrap_or(Screen::Authors)
    }

    fn push(&mut self, screen: Screen) {
        if self.screen() != screen {
            self.screens.push(screen);
        }
    }

    fn render(&mut self) -> String {
        match self.screen() {
            Screen::Authors => render::authors(&self.session.authors_view()),
            Screen::Posts => render::posts(&self.session.posts_view()),
            Screen::Detail => render::detail(&self.session.detail_view()),
            Screen::Starred => render::starred(&self.session.starred_view()),
        }
    }

    /// Apply one command; returns `false` to stop
    async fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Search(text) => {
                let mut settled = self.session.subscribe_search();
                settled.borrow_and_update();
                self.session.search(text);
                let _ = settled.changed().await;
                self.screens.truncate(1);
            }
            Command::Select(id) => {
                self.session.select_author(id);
                self.screens.truncate(1);
                self.push(Screen::Posts);
            }
            Command::Clear => {
                self.session.clear_selection();
                self.screens.truncate(1);
            }
            Command::Page(n) => self.session.set_page(n),
            Command::Next => self.session.next_page(),
            Command::Prev => self.session.prev_page(),
            Command::Star(id) => {
                let starred = self.session.toggle_star(id);
                println!("{} post {}", if starred { "Starred" } else { "Unstarred" }, id);
            }
            Command::Open(id) => {
                self.session.open_post(id);
                self.push(Screen::Detail);
            }
            Command::Back => {
                if self.screens.len() > 1 && self.screens.pop() == Some(Screen::Detail) {
                    self.session.close_post();
                }
            }
            Command::Starred => {
                self.session.show_starred();
                self.push(Screen::Starred);
            }
            Command::New { title, body } => {
                let Some(author_id) = self.session.selection().current_author_id() else {
                    println!("Select an author first");
                    return true;
                };
                match self
                    .session
                    .submit_post(NewPost::new(author_id, title, body))
                    .await
                {
                    Ok(submission) => {
                        println!("✓ Created post {}", submission.post().id);
                        self.session.set_page(1);
                        self.push(Screen::Posts);
                    }
                    Err(e) => println!("{}", render::error(&e)),
                }
            }
            Command::Retry => self.session.retry(),
            Command::Help => {
                println!("{}", HELP);
                return true;
            }
            Command::Quit => return false,
        }

        self.session.settled().await;
        println!("{}\n", self.render());
        true
    }
}

/// Run the browser until `quit` or end of input
pub async fn run(session: BrowseSession) -> Result<()> {
    let mut browser = Browser::new(session);

    browser.session.start();
    browser.session.settled().await;
    println!("{}\n", browser.render());
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading input")? {
        match parse(&line) {
            Ok(Some(command)) => {
                if !browser.apply(command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => println!("{}", msg),
        }
    }

    browser.session.shutdown();
    Ok(())
}
