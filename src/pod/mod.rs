// Project state - the aggregate every engine operation reads and writes
//
// A `Project` is addressed by id through the store and mutated only by the
// progression engine and the task subsystem.

pub mod types;
pub mod validation;

pub use types::{working_days, Member, MemberPhase, Project, ProjectStatus, ProjectTag};
pub use validation::InvariantViolation;


#[cfg(test)]
mod tests {
    use super::test_support::three_member_project;
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_active_member_is_member_at_pointer() {
        let project = three_member_project(Utc::now());
        assert_eq!(project.current_active_member().map(|m| m.id.as_str()), Some("m1"));
        assert_eq!(project.next_member().map(|m| m.id.as_str()), Some("m2"));
        assert_eq!(project.stage_label(), Some("Product"));
    }

    #[test]
    fn test_no_active_member_when_completed_or_planning() {
        let mut project = three_member_project(Utc::now());
        project.status = ProjectStatus::Planning;
        assert!(project.current_active_member().is_none());

        project.status = ProjectStatus::Completed;
        project.current_stage = 3;
        assert!(project.current_active_member().is_none());
        assert!(project.next_member().is_none());
    }

    #[test]
    fn test_progress_percent_rounds_to_whole_number() {
        let mut project = three_member_project(Utc::now());
        assert_eq!(project.progress_percent(), 0);

        project.members[0].completed = true;
        assert_eq!(project.progress_percent(), 33);

        project.members[1].completed = true;
        assert_eq!(project.progress_percent(), 67);

        project.members[2].completed = true;
        assert_eq!(project.progress_percent(), 100);
    }

    #[test]
    fn test_progress_percent_of_empty_project_is_zero() {
        let mut project = three_member_project(Utc::now());
        project.members.clear();
        assert_eq!(project.progress_percent(), 0);
    }

    #[test]
    fn test_member_phases() {
        let now = Utc::now();
        let mut project = three_member_project(now);
        project.members[0].completed = true;
        project.members[0].work_completed_at = Some(now);
        project.members[1].work_started_at = Some(now);

        assert_eq!(project.member_phase(0), Some(MemberPhase::Completed));
        assert_eq!(project.member_phase(1), Some(MemberPhase::Active));
        assert_eq!(project.member_phase(2), Some(MemberPhase::NotStarted));
        assert_eq!(project.member_phase(3), None);
    }

    #[test]
    fn test_working_days_stops_at_completion() {
        let start = Utc::now() - Duration::days(3);
        let mut member = Member::new("m1", "Dhruv Patel", "Product");
        member.work_started_at = Some(start);
        member.work_completed_at = Some(start + Duration::days(2));
        member.completed = true;

        let days = working_days(&member, Utc::now());
        assert!((days - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_json_uses_camel_case_fields() {
        let project = three_member_project(Utc::now());
        let json = serde_json::to_value(&project).unwrap();

        assert_eq!(json["currentStage"], 0);
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["tag"], "Feature");
        assert_eq!(json["members"][0]["handoffLink"], "");
        assert!(json["members"][0]["workStartedAt"].is_string());
    }
}
