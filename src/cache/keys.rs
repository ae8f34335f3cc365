//! Canonical cache keys
//!
//! Keys follow `<domain>:<entity-or-id>[:<qualifier>]`. An absent optional
//! qualifier drops its segment, so `task:list:42` and `task:list:42:open` are
//! separate entries that `task:*` still reaches together.
//!
//! Entity-scoped derived data sits under `<domain>:<id>:...` so that
//! [`InvalidationStrategy::invalidate_entity`](super::InvalidationStrategy::invalidate_entity)
//! can drop it in one pattern. The bare `<domain>:<id>` record is addressed
//! by key.

/// Domain prefixes shared by keys and invalidation patterns.
pub mod domain {
    pub const FORM: &str = "form";
    pub const TASK: &str = "task";
    pub const INCIDENT: &str = "incident";
    pub const CHANGE: &str = "change";
    pub const SERVICE_REQUEST: &str = "service_request";
    pub const KNOWLEDGE: &str = "kb";
    pub const PROJECT: &str = "project";
    pub const USER: &str = "user";
    pub const DASHBOARD: &str = "dashboard";
    pub const REPORT: &str = "report";
    pub const ANALYTICS: &str = "analytics";
    pub const SPRINT: &str = "sprint";
    pub const RELEASE: &str = "release";
    pub const OKR: &str = "okr";
}

/// Key builder for cached domain data.
pub struct CacheKeys;

impl CacheKeys {
    // =========================================================================
    // Forms
    // =========================================================================

    /// Form template definition
    pub fn form_template(form_id: &str) -> String {
        format!("{}:{}:template", domain::FORM, form_id)
    }

    /// Submissions for a form, optionally filtered by status
    pub fn form_submissions(form_id: &str, status: Option<&str>) -> String {
        with_qualifier(format!("{}:{}:submissions", domain::FORM, form_id), status)
    }

    pub fn form_submission(form_id: &str, submission_id: &str) -> String {
        format!("{}:{}:submission:{}", domain::FORM, form_id, submission_id)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn task(task_id: &str) -> String {
        format!("{}:{}", domain::TASK, task_id)
    }

    /// Tasks of a project, optionally filtered by status
    pub fn tasks(project_id: &str, status: Option<&str>) -> String {
        with_qualifier(format!("{}:list:{}", domain::TASK, project_id), status)
    }

    // =========================================================================
    // Service management
    // =========================================================================

    pub fn incident(incident_id: &str) -> String {
        format!("{}:{}", domain::INCIDENT, incident_id)
    }

    /// Incident list, optionally filtered by status
    pub fn incidents(status: Option<&str>) -> String {
        with_qualifier(format!("{}:list", domain::INCIDENT), status)
    }

    pub fn change_request(change_id: &str) -> String {
        format!("{}:{}", domain::CHANGE, change_id)
    }

    pub fn service_request(request_id: &str) -> String {
        format!("{}:{}", domain::SERVICE_REQUEST, request_id)
    }

    pub fn knowledge_article(article_id: &str) -> String {
        format!("{}:{}", domain::KNOWLEDGE, article_id)
    }

    // =========================================================================
    // Projects and planning
    // =========================================================================

    pub fn project(project_id: &str) -> String {
        format!("{}:{}", domain::PROJECT, project_id)
    }

    pub fn project_members(project_id: &str) -> String {
        format!("{}:{}:members", domain::PROJECT, project_id)
    }

    pub fn sprint(sprint_id: &str) -> String {
        format!("{}:{}", domain::SPRINT, sprint_id)
    }

    pub fn release(release_id: &str) -> String {
        format!("{}:{}", domain::RELEASE, release_id)
    }

    pub fn okr(okr_id: &str) -> String {
        format!("{}:{}", domain::OKR, okr_id)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn user(user_id: &str) -> String {
        format!("{}:{}", domain::USER, user_id)
    }

    pub fn user_permissions(user_id: &str) -> String {
        format!("{}:{}:permissions", domain::USER, user_id)
    }

    // =========================================================================
    // Dashboards, reports, analytics
    // =========================================================================

    /// A user's rendered dashboard view
    pub fn dashboard(user_id: &str, view: &str) -> String {
        format!("{}:{}:{}", domain::DASHBOARD, user_id, view)
    }

    /// A generated report, e.g. `report:sla:2024-q1`
    pub fn report(report_type: &str, report_id: &str) -> String {
        format!("{}:{}:{}", domain::REPORT, report_type, report_id)
    }

    /// An analytics aggregate for one time bucket
    pub fn analytics(metric: &str, bucket: &str) -> String {
        format!("{}:{}:{}", domain::ANALYTICS, metric, bucket)
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    /// Every key in a domain: `<domain>:*`
    pub fn domain_pattern(domain: &str) -> String {
        format!("{}:*", domain)
    }

    /// Everything derived from one entity: `<domain>:<id>:*`
    pub fn entity_pattern(domain: &str, entity_id: &str) -> String {
        format!("{}:{}:*", domain, entity_id)
    }
}

fn with_qualifier(base: String, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("{}:{}", base, q),
        None => base,
    }
}
