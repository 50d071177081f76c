use crate::appstate::AppState;
use crate::service::upstream::UpstreamService;

#[derive(Clone)]
pub struct CommonState {
    pub upstream_service: UpstreamService,
}

impl CommonState {
    pub fn new(data: AppState) -> Self {
        Self {
            upstream_service: UpstreamService::new(data),
        }
    }
}
