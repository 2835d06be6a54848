use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use ua_space::ids;
use ua_space::Argument;
use ua_space::Error;
use ua_space::FnMethod;
use ua_space::MethodSignature;
use ua_space::NodeContext;
use ua_space::NodeId;
use ua_space::ObjectTypeAttributes;
use ua_space::QualifiedName;
use ua_space::Result;
use ua_space::Server;
use ua_space::ServerBuilder;
use ua_space::ServerHost;
use ua_space::ServerLifecycle;
use ua_space::ServerMethod;
use ua_space::VariableAttributes;
use ua_space::Variant;

const NAMESPACE_URI: &str = "urn:test:test";
const NUMBER_INTERVAL_MS: u64 = 2000;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    init_observability();

    let server = ServerBuilder::from_env(None)?.build()?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());
    let (host, _handle) = ServerHost::new(server, TestServer::default(), graceful_rx);

    info!("Application started. Waiting for CTRL+C signal...");
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    if let Err(e) = host.run().await {
        error!("server stops: {:?}", e);
        return Err(e);
    }

    info!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(|e| Error::Fatal(e.to_string()))?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| Error::Fatal(e.to_string()))?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::Fatal(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();
}

/// Logs every hook of the node it is attached to.
struct LoggingContext;

impl NodeContext for LoggingContext {
    fn construct(
        &self,
        _server: &Server,
        node_id: &NodeId,
    ) -> Result<()> {
        info!(%node_id, "construct");
        Ok(())
    }

    fn destruct(
        &self,
        _server: &Server,
        node_id: &NodeId,
    ) -> Result<()> {
        info!(%node_id, "destruct");
        Ok(())
    }

    fn read_value(
        &self,
        _server: &Server,
        node_id: &NodeId,
        value: &mut Variant,
    ) -> Result<()> {
        info!(%node_id, ?value, "read");
        Ok(())
    }

    fn write_value(
        &self,
        _server: &Server,
        node_id: &NodeId,
        value: &Variant,
    ) -> Result<()> {
        info!(%node_id, ?value, "write");
        Ok(())
    }
}

fn add_two_numbers() -> Arc<dyn ServerMethod> {
    let signature = MethodSignature::new(
        vec![
            Argument::new("A", ids::DOUBLE).with_description("First number"),
            Argument::new("B", ids::DOUBLE).with_description("Second number"),
        ],
        vec![Argument::new("Sum", ids::DOUBLE).with_description("A + B")],
    );
    Arc::new(FnMethod::new("TestMethod", signature, |_server, _object_id, inputs| {
        let a: f64 = inputs[0].get()?;
        let b: f64 = inputs[1].get()?;
        info!(a, b, "TestMethod called");
        Ok(vec![(a + b).into()])
    }))
}

/// Demo application: a folder with a logged string value, a number updated
/// every two seconds, an "add two numbers" method and an object type with one
/// instance.
#[derive(Default)]
struct TestServer {
    context: Option<Arc<dyn NodeContext>>,
    method: Option<Arc<dyn ServerMethod>>,
}

impl ServerLifecycle for TestServer {
    fn initialise(
        &mut self,
        server: &Arc<Server>,
    ) -> Result<()> {
        let ns = server.add_namespace(NAMESPACE_URI);

        let folder = server.add_folder(
            &ids::OBJECTS_FOLDER,
            QualifiedName::new(ns, "ServerMethodItem"),
            NodeId::string(ns, "ServerMethodItem"),
        )?;

        let context: Arc<dyn NodeContext> = Arc::new(LoggingContext);
        let handle = server.register_context("TestContext", context.clone());
        self.context = Some(context);
        server.add_node(
            ua_space::AddNodeItem::new(
                folder.clone(),
                QualifiedName::new(ns, "String_Value"),
                VariableAttributes::new("A String Value"),
            )
            .with_requested_id(NodeId::string(ns, "String_Value"))
            .with_reference_type(ids::ORGANIZES)
            .with_context(handle),
        )?;

        let number = server.add_variable(
            &ids::OBJECTS_FOLDER,
            QualifiedName::new(ns, "Number_Value"),
            NodeId::string(ns, "Number_Value"),
            VariableAttributes::new(1),
        )?;

        let tick = AtomicI32::new(0);
        let callback = server.add_repeated_callback("Number_Value", NUMBER_INTERVAL_MS, move |cb| {
            let Some(server) = cb.server() else {
                return Ok(());
            };
            let value = tick.fetch_add(7, Ordering::Relaxed) % 100;
            info!(value, "repeated callback setting number value");
            server.write_value(&number, value)
        })?;
        callback.start()?;

        let method = add_two_numbers();
        server.add_method(&folder, QualifiedName::new(ns, "TestMethod"), NodeId::numeric(ns, 12345), method.clone())?;
        self.method = Some(method);
        info!("Added TestMethod - adds two numbers together");

        let object_type = server.add_object_type(
            &ids::BASE_OBJECT_TYPE,
            QualifiedName::new(ns, "TestObjectType"),
            NodeId::string(ns, "TestObjectType"),
            ObjectTypeAttributes::default(),
        )?;
        let current = server.add_property(&object_type, QualifiedName::new(ns, "Current"), 0.0f64)?;
        server.mark_mandatory(&current)?;
        server.add_instance(
            &folder,
            QualifiedName::new(ns, "ExampleInstance"),
            NodeId::string(ns, "ExampleInstance"),
            object_type,
        )?;

        info!(namespace = ns, nodes = server.node_count(), "TestServer initialised");
        Ok(())
    }

    fn terminate(
        &mut self,
        server: &Arc<Server>,
    ) -> Result<()> {
        info!(callbacks = ?server.repeated_callback_names(), "TestServer terminating");
        self.method = None;
        self.context = None;
        Ok(())
    }
}
