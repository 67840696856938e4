use anyhow::{Context, Result};
use arboard::Clipboard;
use micmute::event::MicMuteEvent;
use micmute::notify::{NotificationLayer, notify_visual};
use micmute::poll::StatusService;
use micmute::{ConfigManager, DEFAULT_LOG_LEVEL, LOG_ENV, StatusPresenter, VERSION, icon};
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tray_icon::TrayIconBuilder;
use tray_icon::menu::{AboutMetadataBuilder, Menu, MenuEvent, MenuItem, PredefinedMenuItem};

fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .finish()
        .with(NotificationLayer::new())
        .init();

    // Load config
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    let mut clipboard = Clipboard::new().context("Failed to open clipboard")?;

    // Create the tray menu
    let tray_menu = Menu::new();
    let icon_quit = MenuItem::new("Quit", true, None);
    let icon_copy_config = MenuItem::new("Copy config path", true, None);
    tray_menu.append_items(&[
        // the name of the app
        &MenuItem::new("MicMute", false, None),
        &PredefinedMenuItem::separator(),
        &PredefinedMenuItem::about(
            None,
            Some(
                AboutMetadataBuilder::new()
                    .version(Some(VERSION.to_owned()))
                    .build(),
            ),
        ),
        &icon_copy_config,
        &PredefinedMenuItem::separator(),
        &icon_quit,
    ])?;

    // Set up the event loop
    let mut icon_tray = None;
    let menu_channel = MenuEvent::receiver();

    let event_loop: EventLoop<MicMuteEvent> = EventLoopBuilder::with_user_event().build();
    let event_sender = event_loop.create_proxy();

    // Poller runs on its own runtime and reports back through the proxy. The
    // tray still comes up without one so the config path stays reachable.
    let status = match StatusService::new(&config, event_sender) {
        Ok(status) => Some(status),
        Err(e) => {
            error!("Mic status polling disabled: {:#}", e);
            None
        }
    };
    let mut presenter = StatusPresenter::new(
        status
            .as_ref()
            .map(StatusService::current_state)
            .unwrap_or_default(),
    );
    let notify_on_change = config.notify_on_change();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        if let Event::NewEvents(StartCause::Init) = event {
            // We create the icon once the event loop is actually running
            // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90
            let visual = presenter.current();
            icon_tray.replace(
                TrayIconBuilder::new()
                    .with_menu(Box::new(tray_menu.clone()))
                    .with_tooltip(visual.label())
                    .with_icon(icon::icon(visual))
                    .build()
                    .expect("Failed to create tray icon"),
            );

            // We have to request a redraw here to have the icon actually show up.
            // Tao only exposes a redraw method on the Window so we use core-foundation directly.
            #[cfg(target_os = "macos")]
            unsafe {
                use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                let rl = CFRunLoopGetMain();
                CFRunLoopWakeUp(rl);
            }

            if let Some(Err(e)) = status.as_ref().map(StatusService::start) {
                error!("{:#}", e);
            }

            info!("MicMute ready");
        }

        if let Ok(event) = menu_channel.try_recv() {
            if event.id == icon_quit.id() {
                if let Some(status) = status.as_ref() {
                    status.stop();
                }
                icon_tray.take();
                *control_flow = ControlFlow::Exit;
            } else if event.id == icon_copy_config.id() {
                if let Err(e) =
                    clipboard.set_text(config_manager.config_path().to_string_lossy().into_owned())
                {
                    error!("Failed to copy config path to clipboard: {}", e);
                }
            }
        }

        if let Event::UserEvent(MicMuteEvent::StateChanged(state)) = event {
            if let Some(visual) = presenter.observe(state) {
                info!(state = ?state, visual = ?visual, "Mute state changed");
                if let Some(tray) = icon_tray.as_ref() {
                    tray.set_icon(Some(icon::icon(visual))).ok();
                    tray.set_tooltip(Some(visual.label())).ok();
                }
                if notify_on_change {
                    notify_visual(visual);
                }
            }
        }
    });
}
