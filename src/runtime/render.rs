//! Render entry point.
//!
//! Nothing is created before the process-level `ready` event: [`render`] arms a
//! one-time listener and hands back a [`RenderFuture`] that resolves once the
//! first commit has run.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::config::EnvConfig;
use crate::core::native::NativeHost;
use crate::core::props::Listener;
use crate::element::PublicInstance;
use crate::error::HostError;
use crate::runtime::host_config::HostRenderer;
use crate::runtime::reconciler::{Reconciler, TreeReconciler};

pub type RenderResult = Result<Option<PublicInstance>, HostError>;

/// Shared handle to a reconciler bound to a fresh root.
pub type Container = Rc<RefCell<TreeReconciler<HostRenderer>>>;

/// Creates a root container over `host`.
pub fn create_container(host: Rc<dyn NativeHost>, config: EnvConfig) -> Container {
    Rc::new(RefCell::new(TreeReconciler::new(HostRenderer::with_config(
        host, config,
    ))))
}

/// Renders `element` once the process app reports ready.
///
/// The ready payload becomes the root's launch info before the first commit, so
/// an `onReady` handler on the app element sees it.
pub fn render<R>(reconciler: &Rc<RefCell<R>>, element: R::Element) -> RenderFuture
where
    R: Reconciler<Host = HostRenderer> + 'static,
    R::Element: 'static,
{
    let (sender, receiver) = oneshot::channel();
    let pending = RefCell::new(Some((sender, element)));
    let target = Rc::clone(reconciler);

    let on_ready: Listener = Rc::new(move |args: &[Value]| {
        let Some((sender, element)) = pending.borrow_mut().take() else {
            return;
        };
        let launch_info = args.first().cloned().unwrap_or(Value::Null);
        tracing::debug!("process ready, rendering root");
        let result = mount(&target, element, launch_info);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "initial render failed");
        }
        // Nobody awaiting the future is fine.
        let _ = sender.send(result);
    });

    let app = reconciler.borrow().host().app();
    app.once("ready", on_ready);
    RenderFuture { receiver }
}

fn mount<R>(target: &Rc<RefCell<R>>, element: R::Element, launch_info: Value) -> RenderResult
where
    R: Reconciler<Host = HostRenderer>,
{
    let mut reconciler = target.borrow_mut();
    reconciler.host().set_launch_info(launch_info);
    reconciler.update_container(Some(element))?;
    Ok(reconciler.public_root_instance())
}

/// Resolves with the public root instance after the first commit.
#[derive(Debug)]
pub struct RenderFuture {
    receiver: oneshot::Receiver<RenderResult>,
}

impl RenderFuture {
    /// Non-blocking check: `None` while the ready event has not fired.
    pub fn try_result(&mut self) -> Option<RenderResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(HostError::ReadySignalDropped)),
        }
    }
}

impl Future for RenderFuture {
    type Output = RenderResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(HostError::ReadySignalDropped)))
    }
}
