pub mod docrouter;

pub use docrouter::DocRouterClient;
