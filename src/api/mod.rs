pub mod analytics;
pub mod error;
pub mod health;
pub mod job;
pub mod validation;
pub mod worker;

use std::sync::Arc;

use actix_web::web;

use crate::db::Store;
use self::analytics::{handlers::analytics_config, AnalyticsService};
use self::health::health_config;
use self::job::{handlers::job_config, JobService};
use self::worker::{handlers::worker_config, WorkerService};

/// Register services, extractor configs and every route on top of `store`
pub fn api_config(store: Arc<dyn Store>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |config: &mut web::ServiceConfig| {
        config
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(JobService::new(store.clone())))
            .app_data(web::Data::new(WorkerService::new(store.clone())))
            .app_data(web::Data::new(AnalyticsService::new(store.clone())))
            .app_data(validation::json_config())
            .app_data(validation::query_config())
            .app_data(validation::path_config())
            .configure(health_config)
            .configure(job_config)
            .configure(worker_config)
            .configure(analytics_config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use actix_web::{
        App,
        http::StatusCode,
        middleware::{NormalizePath, TrailingSlash},
        test::{self, TestRequest},
    };
    use serde_json::{Value, json};

    macro_rules! init_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(NormalizePath::new(TrailingSlash::Trim))
                    .configure(api_config(Arc::new(MemoryStore::new()))),
            )
            .await
        };
    }

    /// Send a request and decode the JSON body
    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    macro_rules! create_job {
        ($app:expr, $body:expr) => {{
            let (status, job) = send!($app, TestRequest::post().uri("/jobs/").set_json($body));
            assert_eq!(status, StatusCode::CREATED, "{}", job);
            job["id"].as_i64().unwrap()
        }};
    }

    fn names(list: &Value) -> Vec<&str> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|j| j["name"].as_str().unwrap())
            .collect()
    }

    #[actix_web::test]
    async fn job_worker_round_trip() {
        let app = init_app!();

        let (status, job) = send!(
            app,
            TestRequest::post()
                .uri("/jobs/")
                .set_json(json!({"name": "A", "customer": "B", "status": "Pending"}))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(job["workers"], json!([]));
        assert_eq!(job["status"], "Pending");
        assert!(job["start_date"].is_null());
        let job_id = job["id"].as_i64().unwrap();

        let (status, worker) = send!(
            app,
            TestRequest::post()
                .uri("/workers/")
                .set_json(json!({"name": "W", "role": "R", "job_id": job_id}))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(worker["job_id"], job_id);

        let (status, workers) =
            send!(app, TestRequest::get().uri(&format!("/jobs/{}/workers/", job_id)));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(workers, json!([worker]));

        let (status, fetched) = send!(app, TestRequest::get().uri(&format!("/jobs/{}", job_id)));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["workers"], json!([worker]));
    }

    #[actix_web::test]
    async fn create_job_rejects_bad_input() {
        let app = init_app!();

        let (status, body) = send!(
            app,
            TestRequest::post().uri("/jobs/").set_json(json!({
                "name": "A",
                "customer": "B",
                "start_date": "2024-03-02",
                "end_date": "2024-03-01"
            }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");

        let (status, body) = send!(
            app,
            TestRequest::post().uri("/jobs/").set_json(json!({"name": "", "customer": "B"}))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"]["name"]["errors"].is_array());

        let (status, _) = send!(
            app,
            TestRequest::post()
                .uri("/jobs/")
                .set_json(json!({"name": "A", "customer": "B", "status": "Done"}))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send!(app, TestRequest::post().uri("/jobs/").set_json(json!({"customer": "B"})));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/"));
        assert_eq!(jobs, json!([]));
    }

    #[actix_web::test]
    async fn list_jobs_filters_and_sorts() {
        let app = init_app!();
        create_job!(app, json!({"name": "Roof", "customer": "Smith", "status": "Completed", "start_date": "2024-02-01"}));
        create_job!(app, json!({"name": "Deck", "customer": "Jones", "status": "Pending", "start_date": "2024-01-01"}));
        create_job!(app, json!({"name": "Porch", "customer": "Smithers"}));

        let (status, jobs) = send!(app, TestRequest::get().uri("/jobs/?keyword=SMITH"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&jobs), vec!["Roof", "Porch"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?status=Pending"));
        assert_eq!(names(&jobs), vec!["Deck"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=name"));
        assert_eq!(names(&jobs), vec!["Deck", "Porch", "Roof"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=start_date&desc=true"));
        assert_eq!(names(&jobs), vec!["Porch", "Roof", "Deck"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=status"));
        assert_eq!(names(&jobs), vec!["Roof", "Deck", "Porch"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=status&desc=true"));
        assert_eq!(names(&jobs), vec!["Porch", "Deck", "Roof"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=customer"));
        assert_eq!(names(&jobs), vec!["Deck", "Roof", "Porch"]);

        let (status, jobs) = send!(app, TestRequest::get().uri("/jobs/?sort_by=customer&desc=1"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&jobs), vec!["Porch", "Roof", "Deck"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs/?start_after=2024-01-15"));
        assert_eq!(names(&jobs), vec!["Roof"]);

        let (_, jobs) = send!(app, TestRequest::get().uri("/jobs"));
        assert_eq!(names(&jobs), vec!["Roof", "Deck", "Porch"]);
    }

    #[actix_web::test]
    async fn list_jobs_rejects_bad_queries() {
        let app = init_app!();

        let (status, body) = send!(
            app,
            TestRequest::get().uri("/jobs/?start_after=2024-05-02&end_before=2024-05-01")
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["message"], "start_after date must be before end_before date");

        for uri in [
            "/jobs/?sort_by=budget",
            "/jobs/?start_after=yesterday",
            "/jobs/?status=Unknown",
            "/jobs/?desc=maybe",
        ] {
            let (status, _) = send!(app, TestRequest::get().uri(uri));
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn unparseable_ids_answer_json_not_found() {
        let app = init_app!();

        for req in [
            TestRequest::get().uri("/jobs/abc"),
            TestRequest::get().uri("/jobs/99999999999"),
            TestRequest::get().uri("/jobs/abc/workers"),
            TestRequest::delete().uri("/jobs/abc"),
            TestRequest::put().uri("/workers/x/assign/1"),
        ] {
            let (status, body) = send!(app, req);
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "Not found");
            assert!(body["fields"]["message"].is_string());
        }
    }

    #[actix_web::test]
    async fn delete_job_cascades_to_workers() {
        let app = init_app!();
        let job_id = create_job!(app, json!({"name": "Fence", "customer": "Ng"}));
        let other_id = create_job!(app, json!({"name": "Shed", "customer": "Ng"}));
        send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "A", "role": "R", "job_id": job_id}))
        );
        send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "B", "role": "R", "job_id": other_id}))
        );

        let req = TestRequest::delete().uri(&format!("/jobs/{}", job_id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let (_, workers) = send!(app, TestRequest::get().uri("/workers/"));
        assert_eq!(names(&workers), vec!["B"]);

        let (status, _) = send!(app, TestRequest::get().uri(&format!("/jobs/{}", job_id)));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send!(app, TestRequest::delete().uri(&format!("/jobs/{}", job_id)));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send!(app, TestRequest::get().uri(&format!("/jobs/{}/workers/", job_id)));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn worker_creation_and_filters() {
        let app = init_app!();
        let job_id = create_job!(app, json!({"name": "Fence", "customer": "Ng"}));

        let (status, body) = send!(
            app,
            TestRequest::post()
                .uri("/workers/")
                .set_json(json!({"name": "A", "role": "R", "job_id": job_id + 50}))
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["fields"]["message"], format!("Job with id {} not found", job_id + 50));

        let (status, _) = send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "A", "role": ""}))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, free) = send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "Mara", "role": "Welder"}))
        );
        assert_eq!(status, StatusCode::CREATED);
        assert!(free["job_id"].is_null());
        send!(
            app,
            TestRequest::post()
                .uri("/workers/")
                .set_json(json!({"name": "Omar", "role": "Welder", "job_id": job_id}))
        );
        send!(
            app,
            TestRequest::post()
                .uri("/workers/")
                .set_json(json!({"name": "Marco", "role": "Painter", "job_id": job_id}))
        );

        let (_, workers) = send!(app, TestRequest::get().uri("/workers/?role=weld"));
        assert_eq!(names(&workers), vec!["Mara", "Omar"]);

        let (_, workers) =
            send!(app, TestRequest::get().uri(&format!("/workers/?name=MAR&job_id={}", job_id)));
        assert_eq!(names(&workers), vec!["Omar", "Marco"]);
    }

    #[actix_web::test]
    async fn assign_worker_to_job() {
        let app = init_app!();
        let job_id = create_job!(app, json!({"name": "Fence", "customer": "Ng"}));
        let (_, worker) = send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "A", "role": "R"}))
        );
        let worker_id = worker["id"].as_i64().unwrap();

        let (status, assigned) = send!(
            app,
            TestRequest::put().uri(&format!("/workers/{}/assign/{}", worker_id, job_id))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(assigned["job_id"], job_id);

        for uri in [
            format!("/workers/{}/assign/{}", worker_id + 10, job_id),
            format!("/workers/{}/assign/{}", worker_id, job_id + 10),
        ] {
            let (status, _) = send!(app, TestRequest::put().uri(&uri));
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn analytics_totals_equal_breakdowns() {
        let app = init_app!();
        let job_id = create_job!(app, json!({"name": "Fence", "customer": "Ng", "status": "In Progress"}));
        create_job!(app, json!({"name": "Shed", "customer": "Ng"}));
        send!(
            app,
            TestRequest::post()
                .uri("/workers/")
                .set_json(json!({"name": "A", "role": "Welder", "job_id": job_id}))
        );
        send!(
            app,
            TestRequest::post().uri("/workers/").set_json(json!({"name": "B", "role": "Welder"}))
        );

        let (status, analytics) = send!(app, TestRequest::get().uri("/analytics/"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            analytics,
            json!({
                "total_jobs": 2,
                "jobs_by_status": {"In Progress": 1, "Unspecified": 1},
                "total_workers": 2,
                "workers_by_role": {"Welder": 2},
            })
        );
    }

    #[actix_web::test]
    async fn health_endpoints_answer() {
        let app = init_app!();

        let (status, body) = send!(app, TestRequest::get().uri("/"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API is running");

        let (status, body) = send!(app, TestRequest::get().uri("/health"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send!(app, TestRequest::get().uri("/live"));
        assert_eq!(status, StatusCode::OK);
    }
}
