use actix_web::{
    HttpResponse, get,
    web::{Data, ServiceConfig, scope},
};

use crate::api::error::ServiceError;
use super::service::AnalyticsService;

#[get("")]
async fn get_analytics(service: Data<AnalyticsService>) -> Result<HttpResponse, ServiceError> {
    let analytics = service.get_analytics().await?;
    Ok(HttpResponse::Ok().json(analytics))
}

pub fn analytics_config(config: &mut ServiceConfig) {
    config.service(scope("analytics").service(get_analytics));
}
