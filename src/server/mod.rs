//! Development server: renders every route per request, with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Json, Path, Query, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::analytics::{Analytics, EventSink, Surface, TracingSink};
use crate::content::page::error_chain;
use crate::content::{ArticleSource, DataSource, PageModelBuilder, PageOutcome};
use crate::helpers::article_path;
use crate::seo::{Clock, SystemClock};
use crate::views::Views;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Reports clicks and submits on `data-track` elements to `/__analytics`
const TRACKING_SCRIPT: &str = r#"
<script>
(function() {
    function send(el) {
        var data = { event: el.dataset.track, label: el.dataset.label || '' };
        if (el.dataset.location) data.location = el.dataset.location;
        if (el.dataset.title) data.title = el.dataset.title;
        var body = new Blob([JSON.stringify(data)], { type: 'application/json' });
        navigator.sendBeacon('/__analytics', body);
    }
    document.addEventListener('click', function(e) {
        var el = e.target.closest('a[data-track], button[data-track]');
        if (el) send(el);
    });
    document.addEventListener('submit', function(e) {
        if (e.target.dataset.track) send(e.target);
    });
})();
</script>
</body>
"#;

/// Everything a request needs, rebuilt when the configuration changes
pub struct Runtime<S, K> {
    pub site: Site,
    views: Views,
    source: S,
    clock: Box<dyn Clock + Send + Sync>,
    analytics: Analytics<K>,
}

impl Runtime<DataSource, TracingSink> {
    pub fn new(site: Site) -> Result<Self> {
        let source = site.source();
        let clock = Box::new(SystemClock::new(site.config.tz()));
        Self::with_parts(site, source, clock, TracingSink)
    }
}

impl<S: ArticleSource, K: EventSink> Runtime<S, K> {
    pub fn with_parts(
        site: Site,
        source: S,
        clock: Box<dyn Clock + Send + Sync>,
        sink: K,
    ) -> Result<Self> {
        let analytics = Analytics::new(
            sink,
            Surface::Live,
            site.config.analytics.measurement_id.clone(),
        );
        Ok(Self {
            views: Views::new(&site.config)?,
            site,
            source,
            clock,
            analytics,
        })
    }

    pub fn analytics(&self) -> &Analytics<K> {
        &self.analytics
    }
}

/// Server state
pub struct ServerState<S, K> {
    runtime: RwLock<Arc<Runtime<S, K>>>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl<S, K> ServerState<S, K> {
    pub fn new(runtime: Runtime<S, K>, live_reload: bool) -> Arc<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Arc::new(Self {
            runtime: RwLock::new(Arc::new(runtime)),
            reload_tx,
            live_reload,
        })
    }

    fn runtime(&self) -> Arc<Runtime<S, K>> {
        match self.runtime.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_runtime(&self, runtime: Runtime<S, K>) {
        match self.runtime.write() {
            Ok(mut guard) => *guard = Arc::new(runtime),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(runtime),
        }
    }
}

/// Build the router for the three site routes plus static files
pub fn router<S, K>(state: Arc<ServerState<S, K>>) -> Router
where
    S: ArticleSource + 'static,
    K: EventSink + 'static,
{
    Router::new()
        .route("/", get(landing_handler::<S, K>))
        .route("/blog", get(blog_handler::<S, K>))
        .route("/blog/", get(blog_handler::<S, K>))
        .route("/blog/:slug", get(post_handler::<S, K>))
        .route("/__livereload", get(livereload_handler::<S, K>))
        .route("/__analytics", post(track_handler::<S, K>))
        .fallback(static_handler::<S, K>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let runtime = Runtime::new(site.clone())?;
    tracing::info!("Reading blog content from {}", runtime.source.describe());
    let state = ServerState::new(runtime, watch);
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let state = state.clone();
        let base_dir = site.base_dir.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(base_dir, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content, static files and configuration; tell browsers to reload
fn watch_and_reload(
    base_dir: PathBuf,
    state: Arc<ServerState<DataSource, TracingSink>>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let site = state.runtime().site.clone();
    let mut watched = vec![(site.static_dir.clone(), RecursiveMode::Recursive)];
    if let DataSource::Fs(_) = site.source() {
        watched.push((site.data_dir(), RecursiveMode::Recursive));
    }
    watched.push((site.config_path(), RecursiveMode::NonRecursive));

    for (path, mode) in watched {
        if path.exists() {
            debouncer.watcher().watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if relevant.iter().any(|e| e.path.ends_with(crate::CONFIG_FILE)) {
                    match Site::new(&base_dir).and_then(Runtime::new) {
                        Ok(runtime) => {
                            state.replace_runtime(runtime);
                            tracing::info!("Configuration reloaded");
                        }
                        Err(e) => {
                            tracing::error!("Keeping previous configuration: {:#}", e);
                            continue;
                        }
                    }
                }

                // Notify all connected clients to reload
                let _ = state.reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    #[serde(default)]
    q: String,
}

/// Turn a rendered page into a response, injecting live reload when enabled
fn html_response(rendered: Result<String>, live_reload: bool) -> Response {
    match rendered {
        Ok(html) => {
            let mut html = inject_before_body(&html, TRACKING_SCRIPT);
            if live_reload {
                html = inject_before_body(&html, LIVE_RELOAD_SCRIPT);
            }
            Html(html).into_response()
        }
        Err(e) => {
            tracing::error!("Render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render failed").into_response()
        }
    }
}

async fn landing_handler<S: ArticleSource, K: EventSink>(
    State(state): State<Arc<ServerState<S, K>>>,
) -> Response {
    let rt = state.runtime();
    rt.analytics.track_page_view("/", &rt.site.config.site_name);
    html_response(rt.views.landing(rt.clock.today()), state.live_reload)
}

async fn blog_handler<S: ArticleSource, K: EventSink>(
    State(state): State<Arc<ServerState<S, K>>>,
    Query(query): Query<BlogQuery>,
) -> Response {
    let rt = state.runtime();
    let manifest = match rt.source.fetch_manifest().await {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::warn!("{}; rendering an empty listing", error_chain(&e));
            None
        }
    };

    rt.analytics.track_page_view("/blog", "Blog");
    let rendered = rt.views.blog(manifest.as_ref(), &query.q, rt.clock.today());
    html_response(rendered, state.live_reload)
}

async fn post_handler<S: ArticleSource, K: EventSink>(
    State(state): State<Arc<ServerState<S, K>>>,
    Path(slug): Path<String>,
) -> Response {
    let rt = state.runtime();
    let outcome = match PageModelBuilder::new(&rt.source).load(&slug).await {
        Ok(outcome) => outcome,
        // Only a missing manifest fails the build
        Err(e) => {
            tracing::error!("{}", error_chain(&e));
            return Redirect::to("/blog").into_response();
        }
    };

    let model = match outcome {
        PageOutcome::NotFound => {
            tracing::info!("Unknown article {:?}, redirecting to /blog", slug);
            return Redirect::to("/blog").into_response();
        }
        PageOutcome::Partial(model) | PageOutcome::Full(model) => model,
    };

    let title = &model.article.summary.title;
    rt.analytics.track_page_view(&article_path(&slug), title);
    rt.analytics.track_article_view(title, &slug);
    html_response(rt.views.post(&model, rt.clock.today()), state.live_reload)
}

/// Interaction reported by the page script
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    ButtonClick {
        label: String,
        #[serde(default)]
        location: Option<String>,
    },
    FormSubmit {
        label: String,
    },
    SocialShare {
        label: String,
        #[serde(default)]
        title: Option<String>,
    },
}

async fn track_handler<S: ArticleSource, K: EventSink>(
    State(state): State<Arc<ServerState<S, K>>>,
    Json(event): Json<ClientEvent>,
) -> StatusCode {
    let rt = state.runtime();
    let analytics = &rt.analytics;
    match &event {
        ClientEvent::ButtonClick { label, location } => {
            analytics.track_button_click(label, location.as_deref())
        }
        ClientEvent::FormSubmit { label } => analytics.track_form_submit(label),
        ClientEvent::SocialShare { label, title } => {
            analytics.track_social_share(label, title.as_deref())
        }
    }
    StatusCode::NO_CONTENT
}

/// WebSocket handler for live reload
async fn livereload_handler<S: ArticleSource, K: EventSink>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState<S, K>>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve files from the static directory
async fn static_handler<S: ArticleSource, K: EventSink>(
    State(state): State<Arc<ServerState<S, K>>>,
    request: Request<Body>,
) -> Response {
    let static_dir = state.runtime().site.static_dir.clone();
    let mut service = ServeDir::new(&static_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Inject a script (ending in `</body>`) into HTML content
fn inject_before_body(html: &str, script: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", script, 1)
    } else {
        format!("{}{}", html, script)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
