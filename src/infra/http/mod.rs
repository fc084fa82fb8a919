mod middleware;
mod public;

pub use middleware::RequestContext;
pub use public::{HttpState, build_router};

pub(crate) const METRIC_HTTP_RESPONSES: &str = "nostalgia_http_responses_total";
