use anyhow::{Context as _, Result};
use canvas::{NodeMoved, NodeSelected, SelectionCleared, SpatialCanvas};
use gpui::*;
use gpui_component::{ActiveTheme, Root};
use gpui_component_assets::Assets;
use spatialviz_scene::{Size, SpatialScene, render_frame};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod card;
mod kdl;

use crate::card::NodeCard;
use crate::kdl::{SceneDocument, parse_scene};

const EXAMPLE: &str = include_str!("../scenes/pipeline.kdl");

const SNAPSHOT_SIZE: Size = Size {
    width: 1200.0,
    height: 800.0,
};

pub struct Viewer {
    canvas: Entity<SpatialCanvas<NodeCard>>,
    _subscriptions: Vec<Subscription>,
}

impl Viewer {
    pub fn new(document: SceneDocument, cx: &mut Context<Self>) -> Self {
        let SceneDocument {
            config,
            interactive,
            nodes,
        } = document;
        let canvas = cx.new(|_| SpatialCanvas::new(nodes, config).interactive(interactive));

        let _subscriptions = vec![
            cx.subscribe(&canvas, |_this, _canvas, event: &NodeSelected, _cx| {
                info!(node = %event.node_id, "node selected");
            }),
            cx.subscribe(&canvas, |_this, _canvas, event: &NodeMoved, _cx| {
                let p = event.position;
                info!(node = %event.node_id, x = p.x, y = p.y, z = p.z, "node moved");
            }),
            cx.subscribe(&canvas, |_this, _canvas, _event: &SelectionCleared, _cx| {
                info!("selection cleared");
            }),
        ];

        Self {
            canvas,
            _subscriptions,
        }
    }
}

impl Render for Viewer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .id("viewer")
            .size_full()
            .bg(cx.theme().background)
            .text_color(cx.theme().foreground)
            .child(self.canvas.clone())
    }
}

/// `gpui-spatialviz [SCENE.kdl] [--snapshot OUT.svg]`
#[derive(Debug, Default, PartialEq)]
struct Args {
    scene: Option<String>,
    snapshot: Option<String>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--snapshot" => {
                    parsed.snapshot = Some(args.next().context("--snapshot needs an output path")?);
                }
                _ if parsed.scene.is_none() => parsed.scene = Some(arg),
                _ => anyhow::bail!("unexpected argument {arg:?}"),
            }
        }
        Ok(parsed)
    }
}

/// The scene named on the command line, or the bundled demo
fn load_document(path: Option<&str>) -> Result<SceneDocument> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {path}"))?;
            parse_scene(&content).with_context(|| format!("failed to load scene {path}"))
        }
        None => parse_scene(EXAMPLE).context("bundled scene is invalid"),
    }
}

/// Render the scene at rest to an SVG file instead of opening a window
fn write_snapshot(document: SceneDocument, path: &str) -> Result<()> {
    let mut scene = SpatialScene::new(document.nodes, document.config).with_interactive(false);
    scene.set_viewport(SNAPSHOT_SIZE);
    let markup = render_frame(&scene.frame(), |card| card.title.clone()).to_string();
    std::fs::write(path, markup).with_context(|| format!("failed to write snapshot {path}"))?;
    info!(path, "snapshot written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Our crates at debug, everything else at warn
            "gpui_spatialviz=debug,spatialviz_scene=debug,canvas=debug,warn".into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let document = load_document(args.scene.as_deref())?;
    if let Some(path) = args.snapshot.as_deref() {
        return write_snapshot(document, path);
    }
    info!(nodes = document.nodes.len(), "starting viewer");

    let app = Application::new().with_assets(Assets);
    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        let window_opts = WindowOptions {
            titlebar: Some(TitlebarOptions {
                title: Some("Spatial Viz".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let opened = cx.open_window(window_opts, |window, cx| {
            let view: AnyView = cx.new(|cx| Viewer::new(document, cx)).into();
            cx.new(|cx| Root::new(view, window, cx))
        });
        if let Err(err) = opened {
            error!("failed to open window: {err:#}");
            cx.quit();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_args() {
        assert_eq!(args(&[]).unwrap(), Args::default());
        assert_eq!(
            args(&["demo.kdl", "--snapshot", "out.svg"]).unwrap(),
            Args {
                scene: Some("demo.kdl".into()),
                snapshot: Some("out.svg".into()),
            }
        );
        assert!(args(&["--snapshot"]).is_err());
        assert!(args(&["a.kdl", "b.kdl"]).is_err());
    }

    #[test]
    fn test_bundled_scene_snapshot() {
        let document = load_document(None).unwrap();
        let mut scene = SpatialScene::new(document.nodes, document.config).with_interactive(false);
        scene.set_viewport(SNAPSHOT_SIZE);
        let markup = render_frame(&scene.frame(), |card| card.title.clone()).to_string();
        assert!(markup.contains("Ingest"));
        assert!(markup.contains("Metrics"));
    }
}
