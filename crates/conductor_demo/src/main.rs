mod backend;

use std::io;
use std::rc::Rc;

use conductor::{
    create_container, listener, logging, render, EnvConfig, NativeHost, Node, Props, Reconciler,
};
use serde_json::{json, Value};

use backend::LogHost;

fn tree(bounce: bool) -> Node {
    let on_ready = listener(|args: &[Value]| {
        tracing::info!(launch_info = ?args.first(), "onReady");
    });
    let on_resize = listener(|args: &[Value]| {
        tracing::info!(size = ?args.first(), "onResize");
    });

    let child = |name: &str| {
        Node::new(
            "WINDOW",
            Props::new()
                .with("defaultSize", json!([400, 300]))
                .with("path", json!(format!("{name}.html"))),
        )
        .key(name)
    };

    Node::new(
        "APP",
        Props::new()
            .with("dockBounce", json!(bounce))
            .on("onReady", on_ready),
    )
    .child(Node::new("MENU", Props::new()))
    .child(
        Node::new(
            "WINDOW",
            Props::new()
                .with("show", json!(true))
                .with("size", json!([1024, 768]))
                .on("onResize", on_resize)
                .with("path", json!("https://example.com")),
        )
        .key("main")
        .children([child("left"), child("right")]),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    logging::init(&config).map_err(io::Error::other)?;

    let host = Rc::new(LogHost::default());
    let container = create_container(Rc::clone(&host) as Rc<dyn NativeHost>, config);

    let rendered = render(&container, tree(true));
    host.native_app().emit("ready", &[json!({"demo": true})]);
    let root = rendered.await.map_err(io::Error::other)?;
    tracing::info!(?root, "rendered");

    for round in 0..3 {
        container
            .borrow_mut()
            .update_container(Some(tree(round % 2 == 1)))
            .map_err(io::Error::other)?;
    }

    if let Some(main_window) = host.windows().first() {
        main_window.emit("resize", &[]);
        main_window.emit("closed", &[]);
    }
    container
        .borrow_mut()
        .update_container(Some(tree(false)))
        .map_err(io::Error::other)?;

    container
        .borrow_mut()
        .update_container(None)
        .map_err(io::Error::other)?;
    tracing::info!("unmounted");
    Ok(())
}
