use anyhow::{Context, Result};
use argocd_chat::app::{App, TICK_RATE};
use argocd_chat::config::ChatSettings;
use argocd_chat::event::Event;
use argocd_chat::{logging, tui, ui};
use crossterm::event::{Event as CrosstermEvent, EventStream};
use futures_util::StreamExt;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let workspace = std::env::current_dir().context("無法取得目前工作目錄")?;
    logging::init(&workspace)?;
    let settings = ChatSettings::load(&workspace)?;
    info!("Starting argocd-chat against {}", settings.platform.origin);

    let mut app = App::new(workspace, settings)?;
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut stream = EventStream::new();
    let mut interval = tokio::time::interval(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        let event = tokio::select! {
            _ = interval.tick() => Event::Tick,
            maybe_event = stream.next() => {
                match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => Event::Key(key),
                    Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => break,
                }
            }
        };

        match event {
            Event::Tick => app.on_tick(),
            Event::Key(key) => {
                app.handle_key(key);
                app.on_tick();
            }
            Event::Resize => {}
        }
    }
    info!("Shutting down");
    Ok(())
}
