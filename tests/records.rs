//! Integration tests for record listing, CRUD and the dashboard.

mod common;

use campus_admin::{
    AdminError, CourseForm, DashboardStats, PageRequest, University, UniversityForm,
};

use common::{course, event, university, Harness};

// ============================================================================
// Listing
// ============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_last_page_of_47() {
        let harness = Harness::logged_in().await;
        for id in 1..=47 {
            harness.backend.insert("universities", university(id, &format!("Uni {}", id)));
        }

        let page = harness
            .client
            .universities()
            .list(PageRequest::new(5, 10))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 7);
        assert_eq!(page.total, 47);
        assert_eq!(page.total_pages(10), 5);
        assert_eq!(page.items[0].name, "Uni 41");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let harness = Harness::logged_in().await;
        let page = harness.client.events().list(PageRequest::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages(10), 0);
    }

    #[tokio::test]
    async fn test_reads_are_never_cached() {
        let harness = Harness::logged_in().await;
        harness.backend.insert("courses", course(1, "Algebra"));

        let courses = harness.client.courses();
        courses.get(1).await.unwrap();
        courses.get(1).await.unwrap();

        assert_eq!(harness.backend.calls(), vec!["GET /courses/1", "GET /courses/1"]);
    }
}

// ============================================================================
// CRUD
// ============================================================================

mod crud {
    use super::*;

    #[tokio::test]
    async fn test_create_update_delete_university() {
        let harness = Harness::logged_in().await;
        let universities = harness.client.universities();

        let created: University = universities
            .create(&UniversityForm {
                name: "Rust University".to_string(),
                website: "https://rust.example.edu".to_string(),
                is_active: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Rust University");

        let mut form = UniversityForm::from(&created);
        form.location = "Berlin".to_string();
        universities.update(created.id, &form).await.unwrap();

        let fetched = universities.get(created.id).await.unwrap();
        assert_eq!(fetched.location.as_deref(), Some("Berlin"));
        assert_eq!(fetched.website.as_deref(), Some("https://rust.example.edu"));

        universities.delete(created.id).await.unwrap();
        let err = universities.get(created.id).await.unwrap_err();
        assert!(matches!(err, AdminError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_course_form_carries_university() {
        let harness = Harness::logged_in().await;
        let created = harness
            .client
            .courses()
            .create(&CourseForm {
                title: "Systems".to_string(),
                university_id: 3,
                is_active: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.university_id, Some(3));
        let body = harness.backend.requests.lock().unwrap()[0].body.clone().unwrap();
        assert_eq!(body["universityId"], 3);
    }

    #[tokio::test]
    async fn test_backend_validation_message_is_surfaced() {
        let harness = Harness::logged_in().await;
        let err = harness.client.universities().get(999).await.unwrap_err();
        assert_eq!(err.user_message("Failed to fetch data"), "Not Found");
    }
}

// ============================================================================
// Dashboard
// ============================================================================

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn test_counts_come_from_totals() {
        let harness = Harness::logged_in().await;
        harness.backend.insert("universities", university(1, "MIT"));
        harness.backend.insert("universities", university(2, "ETH"));
        harness.backend.insert("courses", course(1, "Algebra"));
        for id in 1..=3 {
            harness.backend.insert("events", event(id, "Expo"));
        }

        let stats = DashboardStats::fetch(&harness.client).await.unwrap();
        assert_eq!(stats.universities_count, 2);
        assert_eq!(stats.courses_count, 1);
        assert_eq!(stats.events_count, 3);

        let requests = harness.backend.requests.lock().unwrap();
        assert!(requests
            .iter()
            .all(|r| r.query == vec![("limit".to_string(), "1".to_string())]));
    }

    #[tokio::test]
    async fn test_one_failed_count_fails_the_dashboard() {
        let harness = Harness::logged_in().await;
        harness.backend.fail_path("/courses");

        let err = DashboardStats::fetch(&harness.client).await.unwrap_err();
        assert_eq!(
            err.user_message("Failed to load dashboard stats"),
            "Failed to load dashboard stats"
        );
    }
}
