//! Interactive session.
//!
//! One loop owns the view and sort state. Network calls run as spawned
//! tasks and report back over a channel, so every state change happens on
//! the loop. Rate fetches are never cancelled: several can be in flight and
//! the view's stale policy decides which responses land.

use super::{ui, view};
use crate::core::{
    ExchangeRateProvider, ExchangeRates, RateColumn, RateRequest, SortState, StalePolicy,
    ViewState,
};
use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

const HELP: &str =
    "Enter a number or code to select, `s <column>` to sort, `r` to reload, `q` to quit";
const SORT_USAGE: &str =
    "Usage: s <column>, where column is 1-3, base-currency, currency or exchange-rate";

#[derive(Debug)]
pub enum Event {
    Currencies(Result<Vec<String>>),
    Rates(RateRequest, Result<ExchangeRates>),
    Input(String),
    InputClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(usize),
    /// A currency code as typed; matched against the list ignoring case.
    SelectCode(String),
    Sort(RateColumn),
    SortUsage,
    Reload,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        match line {
            "" => None,
            "q" | "quit" | "exit" => Some(Command::Quit),
            "r" | "reload" => Some(Command::Reload),
            "s" | "sort" => Some(Command::SortUsage),
            _ => {
                if let Some(column) = line.strip_prefix("s ") {
                    return Some(
                        column
                            .parse()
                            .map_or(Command::SortUsage, Command::Sort),
                    );
                }
                if let Ok(index) = line.parse::<usize>() {
                    return Some(Command::Select(index));
                }
                line.chars()
                    .all(|c| c.is_ascii_alphanumeric())
                    .then(|| Command::SelectCode(line.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    provider: Arc<dyn ExchangeRateProvider>,
    state: ViewState,
    sort: SortState<RateColumn>,
    notice: Option<String>,
    events: UnboundedSender<Event>,
    currencies_pending: bool,
    rates_in_flight: usize,
    input_closed: bool,
}

impl Session {
    pub fn new(
        provider: Arc<dyn ExchangeRateProvider>,
        stale_policy: StalePolicy,
        events: UnboundedSender<Event>,
    ) -> Self {
        Self {
            provider,
            state: ViewState::new(stale_policy),
            sort: SortState::new(),
            notice: None,
            events,
            currencies_pending: false,
            rates_in_flight: 0,
            input_closed: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn sort(&self) -> &SortState<RateColumn> {
        &self.sort
    }

    /// Whether a spawned request has yet to report back.
    pub fn has_pending_requests(&self) -> bool {
        self.currencies_pending || self.rates_in_flight > 0
    }

    /// Starts the one-time currency load.
    pub fn start(&mut self) {
        self.currencies_pending = true;
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = provider.fetch_currencies().await;
            let _ = events.send(Event::Currencies(result));
        });
    }

    fn spawn_rates(&mut self, request: RateRequest) {
        self.rates_in_flight += 1;
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = provider.fetch_rates(&request.currency).await;
            let _ = events.send(Event::Rates(request, result));
        });
    }

    /// Applies one event. Once input has closed the session lingers until
    /// every outstanding request has landed, so no completion is lost.
    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Currencies(result) => {
                self.currencies_pending = false;
                self.state.currencies_loaded(result);
            }
            Event::Rates(request, result) => {
                self.rates_in_flight = self.rates_in_flight.saturating_sub(1);
                self.state.rates_loaded(&request, result);
            }
            Event::Input(line) => {
                self.notice = None;
                match Command::parse(&line) {
                    Some(command) => return self.execute(command),
                    None if line.trim().is_empty() => {}
                    None => self.notice = Some(format!("Unknown input: {}", line.trim())),
                }
            }
            Event::InputClosed => {
                debug!(pending = self.has_pending_requests(), "Input closed");
                self.input_closed = true;
            }
        }

        if self.input_closed && !self.has_pending_requests() {
            Flow::Quit
        } else {
            Flow::Continue
        }
    }

    fn execute(&mut self, command: Command) -> Flow {
        debug!(?command, "Executing command");
        let request = match command {
            Command::Quit => return Flow::Quit,
            Command::Sort(column) => {
                self.sort.toggle(column);
                None
            }
            Command::SortUsage => {
                self.notice = Some(SORT_USAGE.to_string());
                None
            }
            Command::Reload => self.state.refresh(),
            Command::Select(0) => self.state.select(""),
            Command::Select(index) => match self.state.currencies().get(index - 1).cloned() {
                Some(code) => self.state.select(&code),
                None => {
                    self.notice = Some(format!("No option {index}"));
                    None
                }
            },
            Command::SelectCode(code) => {
                let listed = self
                    .state
                    .currencies()
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(&code))
                    .cloned();
                if let Some(listed) = listed {
                    self.state.select(&listed)
                } else {
                    self.notice = Some(format!("Unknown currency: {code}"));
                    None
                }
            }
        };

        if let Some(request) = request {
            self.spawn_rates(request);
        }
        Flow::Continue
    }

    pub fn frame(&self) -> String {
        let mut output = view::render_frame(&self.state, &self.sort);
        output.push_str("\n\n");
        if let Some(notice) = &self.notice {
            output.push_str(&ui::style_text(notice, ui::StyleType::Error));
            output.push('\n');
        }
        output.push_str(&ui::style_text(HELP, ui::StyleType::Subtle));
        output
    }
}

fn draw(term: &console::Term, session: &Session) -> Result<()> {
    if term.is_term() {
        term.clear_screen()?;
    } else {
        ui::print_separator();
    }
    term.write_line(&session.frame())?;
    Ok(())
}

/// Feeds events to `session` until it quits or every sender is gone,
/// redrawing after each one.
pub async fn event_loop(
    session: &mut Session,
    events: &mut UnboundedReceiver<Event>,
    term: &console::Term,
) -> Result<()> {
    draw(term, session)?;
    while let Some(event) = events.recv().await {
        let flow = session.handle(event);
        draw(term, session)?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

pub async fn run(provider: Arc<dyn ExchangeRateProvider>, stale_policy: StalePolicy) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Blocking reads stay off the runtime; the thread is left behind on quit.
    let input = tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = input.send(Event::InputClosed);
    });

    let mut session = Session::new(provider, stale_policy, tx);
    session.start();
    event_loop(&mut session, &mut rx, &console::Term::stdout()).await?;

    info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticProvider {
        currencies: Option<Vec<String>>,
    }

    #[async_trait]
    impl ExchangeRateProvider for StaticProvider {
        async fn fetch_currencies(&self) -> Result<Vec<String>> {
            self.currencies
                .clone()
                .ok_or_else(|| anyhow!("service unavailable"))
        }

        async fn fetch_rates(&self, base_currency: &str) -> Result<ExchangeRates> {
            match base_currency {
                "USD" => Ok(vec![("EUR".to_string(), 0.9), ("GBP".to_string(), 0.8)]
                    .into_iter()
                    .collect()),
                _ => Err(anyhow!("no rates for {base_currency}")),
            }
        }
    }

    fn session(currencies: Option<Vec<&str>>) -> (Session, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = StaticProvider {
            currencies: currencies.map(|c| c.into_iter().map(String::from).collect()),
        };
        (Session::new(Arc::new(provider), StalePolicy::Discard, tx), rx)
    }

    async fn pump(session: &mut Session, rx: &mut UnboundedReceiver<Event>) -> Flow {
        let event = rx.recv().await.expect("channel closed");
        session.handle(event)
    }

    fn input(session: &mut Session, line: &str) -> Flow {
        session.handle(Event::Input(line.to_string()))
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse(" r "), Some(Command::Reload));
        assert_eq!(Command::parse("2"), Some(Command::Select(2)));
        assert_eq!(
            Command::parse("usd"),
            Some(Command::SelectCode("usd".to_string()))
        );
        assert_eq!(
            Command::parse("s 3"),
            Some(Command::Sort(RateColumn::ExchangeRate))
        );
        assert_eq!(
            Command::parse("s currency"),
            Some(Command::Sort(RateColumn::Currency))
        );
        assert_eq!(Command::parse("s nonsense"), Some(Command::SortUsage));
        assert_eq!(Command::parse("s"), Some(Command::SortUsage));
        assert_eq!(Command::parse("what?"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_session_loads_currencies_then_rates() {
        let (mut session, mut rx) = session(Some(vec!["USD", "EUR"]));
        session.start();
        pump(&mut session, &mut rx).await;
        assert_eq!(session.state().currencies(), ["USD", "EUR"]);

        assert_eq!(input(&mut session, "1"), Flow::Continue);
        assert!(session.state().is_loading());
        assert!(session.frame().contains(view::LOADING));

        pump(&mut session, &mut rx).await;
        assert!(!session.state().is_loading());
        let rows = session.state().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].base_currency, "USD");
        assert_eq!(rows[0].currency, "EUR");
        assert_eq!(rows[1].currency, "GBP");
    }

    #[tokio::test]
    async fn test_session_currency_failure() {
        let (mut session, mut rx) = session(None);
        session.start();
        pump(&mut session, &mut rx).await;
        assert!(session.state().currencies().is_empty());
        assert_eq!(
            session.state().error(),
            Some(crate::core::state::CURRENCIES_ERROR)
        );
    }

    #[tokio::test]
    async fn test_session_rate_failure_then_recover() {
        let (mut session, mut rx) = session(Some(vec!["USD", "EUR"]));
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "EUR");
        pump(&mut session, &mut rx).await;
        assert_eq!(
            session.state().error(),
            Some(crate::core::state::RATES_ERROR)
        );
        assert!(!session.state().is_loading());

        input(&mut session, "usd");
        assert_eq!(session.state().error(), None);
        pump(&mut session, &mut rx).await;
        assert_eq!(session.state().rows().len(), 2);
    }

    #[tokio::test]
    async fn test_session_sort_and_unknown_input() {
        let (mut session, mut rx) = session(Some(vec!["USD"]));
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "s 2");
        assert_eq!(
            session.sort().sorting(),
            Some((RateColumn::Currency, crate::core::SortDirection::Ascending))
        );

        input(&mut session, "7");
        assert!(session.frame().contains("No option 7"));
        input(&mut session, "JPY");
        assert!(session.frame().contains("Unknown currency: JPY"));
        input(&mut session, "?!");
        assert!(session.frame().contains("Unknown input: ?!"));
        assert_eq!(session.state().selected(), None);
    }

    #[tokio::test]
    async fn test_session_quit() {
        let (mut session, _rx) = session(Some(vec![]));
        assert_eq!(input(&mut session, "q"), Flow::Quit);
        assert_eq!(session.handle(Event::InputClosed), Flow::Quit);
    }
    #[tokio::test]
    async fn test_bare_sort_shows_usage() {
        let (mut session, mut rx) = session(Some(vec!["USD"]));
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "s");
        assert!(session.frame().contains(SORT_USAGE));
        assert!(!session.frame().contains("Unknown currency"));
        assert_eq!(session.sort().sorting(), None);
    }

    #[tokio::test]
    async fn test_select_code_uses_listed_spelling() {
        let (mut session, mut rx) = session(Some(vec!["USD", "eur"]));
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "EUR");
        assert_eq!(session.state().selected(), Some("eur"));
        pump(&mut session, &mut rx).await;
        // StaticProvider only quotes "USD", so the listed spelling reached it.
        assert_eq!(
            session.state().error(),
            Some(crate::core::state::RATES_ERROR)
        );

        input(&mut session, "usd");
        assert_eq!(session.state().selected(), Some("USD"));
    }

    #[tokio::test]
    async fn test_input_closed_waits_for_outstanding_fetch() {
        let (mut session, mut rx) = session(Some(vec!["USD", "EUR"]));
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "1");
        assert!(session.has_pending_requests());
        assert_eq!(session.handle(Event::InputClosed), Flow::Continue);
        assert!(session.state().is_loading());

        assert_eq!(pump(&mut session, &mut rx).await, Flow::Quit);
        assert!(!session.has_pending_requests());
        assert!(!session.state().is_loading());
        assert_eq!(session.state().rows().len(), 2);
    }

    #[tokio::test]
    async fn test_input_closed_before_currencies_land() {
        let (mut session, mut rx) = session(Some(vec!["USD"]));
        session.start();
        assert_eq!(session.handle(Event::InputClosed), Flow::Continue);
        assert_eq!(pump(&mut session, &mut rx).await, Flow::Quit);
        assert_eq!(session.state().currencies(), ["USD"]);
    }

    #[tokio::test]
    async fn test_event_loop_renders_late_completion() {
        let (mut session, mut rx) = session(Some(vec!["USD", "EUR"]));
        session.start();
        pump(&mut session, &mut rx).await;
        input(&mut session, "USD");

        session
            .events
            .send(Event::InputClosed)
            .expect("receiver alive");
        event_loop(&mut session, &mut rx, &console::Term::stdout())
            .await
            .expect("event loop failed");

        assert!(!session.has_pending_requests());
        assert_eq!(session.state().rows().len(), 2);
        assert!(!session.frame().contains(view::LOADING));
    }

    /// Answers rates for `slow` only after a delay, every other base at once.
    struct SlowBaseProvider {
        slow: &'static str,
    }

    #[async_trait]
    impl ExchangeRateProvider for SlowBaseProvider {
        async fn fetch_currencies(&self) -> Result<Vec<String>> {
            Ok(vec!["USD".to_string(), "EUR".to_string()])
        }

        async fn fetch_rates(&self, base_currency: &str) -> Result<ExchangeRates> {
            if base_currency == self.slow {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            let target = if base_currency == "USD" { "EUR" } else { "USD" };
            Ok(vec![(target.to_string(), 1.0)].into_iter().collect())
        }
    }

    /// Selects USD (slow) then EUR (fast) and drains both responses.
    async fn overlapping_selections(stale_policy: StalePolicy) -> Session {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let provider = SlowBaseProvider { slow: "USD" };
        let mut session = Session::new(Arc::new(provider), stale_policy, tx);
        session.start();
        pump(&mut session, &mut rx).await;

        input(&mut session, "USD");
        input(&mut session, "EUR");
        assert!(session.has_pending_requests());
        while session.has_pending_requests() {
            pump(&mut session, &mut rx).await;
        }
        session
    }

    #[tokio::test]
    async fn test_late_response_discarded() {
        let session = overlapping_selections(StalePolicy::Discard).await;
        let rows = session.state().rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_currency, "EUR");
        assert_eq!(rows[0].currency, "USD");
        assert!(!session.state().is_loading());
    }

    #[tokio::test]
    async fn test_late_response_applied() {
        let session = overlapping_selections(StalePolicy::Apply).await;
        let rows = session.state().rows();
        assert_eq!(rows.len(), 1);
        // USD's rates landed last and are shown against the EUR selection.
        assert_eq!(rows[0].base_currency, "EUR");
        assert_eq!(rows[0].currency, "EUR");
        assert!(!session.state().is_loading());
    }
}
