use gosub_request_hook::{
    config::{HookConfig, LogLevel},
    hook::HookedFactory,
    logging,
    net::HttpFetcher,
    pagination::{PaginationRewriter, HOOK_NAME},
    xhr::{listener, ReadyState, RequestFactory, StandardRequestFactory, XhrEvent},
};

use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The site to talk to. Relative request URLs are resolved against this origin.
    let origin = std::env::args().nth(1).unwrap_or_else(|| "http://localhost:8080/".into());

    let config = HookConfig::builder()
        .base_url(origin.parse()?)
        .log_level(LogLevel::Debug)
        .build()?;
    logging::init(config.log_level);

    // Both the real request objects and the pagination rewriter fetch through the same client
    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent)?);

    // Register the rewriter in the process-wide registry. Every hooked factory installed with
    // `install_global` consults it.
    gosub_request_hook::insert_hook(HOOK_NAME, PaginationRewriter::new(fetcher.clone())?);

    // Install the hook layer on top of the standard factory. Installing a second time would
    // only log a warning and hand back the same factory.
    let standard = Arc::new(StandardRequestFactory::new(fetcher, config.base_url.clone()));
    let factory = HookedFactory::install_global(standard, &config)?;
    let factory = HookedFactory::install_global(factory, &config)?;

    // From here on the page code only sees a plain request object
    let request = factory.create();
    let done = Arc::new(Notify::new());
    for event in XhrEvent::ALL {
        let done = done.clone();
        request.add_event_listener(
            event,
            listener(move |event, this| {
                println!("{:>18} readyState={} status={}", event.to_string(), this.ready_state(), this.status());
                if matches!(event, XhrEvent::LoadEnd | XhrEvent::Error) {
                    done.notify_one();
                }
            }),
        );
    }

    request.open("GET", "/api/pc/pickup_content?pickup_id=1&number=10")?;
    request.set_request_header("Accept", "application/json")?;
    request.send()?;
    done.notified().await;

    if request.ready_state() == ReadyState::Done && request.status() != 0 {
        println!("{} {}", request.status(), request.status_text());
        println!("{}", request.response_text());
    } else {
        println!("request failed");
    }

    Ok(())
}
