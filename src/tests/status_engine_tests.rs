//! tests/status_engine_tests.rs

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::models::{delivery_model::DeliveryOutcome, recipient_model::SendStatus};
    use crate::services::status_engine::{
        apply_outcome, is_due, is_eligible_for_review, is_eligible_for_send, is_pending_today,
    };
    use crate::tests::{record, today};

    #[test]
    fn due_only_two_days_before_expiry() {
        let t = today();
        assert!(is_due(t, t + Duration::days(2)));
        assert!(!is_due(t, t + Duration::days(1)));
        assert!(!is_due(t, t + Duration::days(3)));
        assert!(!is_due(t, t));
        assert!(!is_due(t, t - Duration::days(2)));
    }

    #[test]
    fn due_across_month_and_year_boundaries() {
        let dec_30 = chrono::NaiveDate::from_ymd_opt(2026, 12, 30).unwrap();
        let jan_1 = chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert!(is_due(dec_30, jan_1));

        let feb_27 = chrono::NaiveDate::from_ymd_opt(2028, 2, 27).unwrap();
        let feb_29 = chrono::NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        assert!(is_due(feb_27, feb_29));
    }

    #[test]
    fn send_gate_is_case_insensitive() {
        assert!(!is_eligible_for_send(&SendStatus::parse("Send")));
        assert!(!is_eligible_for_send(&SendStatus::parse("ERROR")));
        assert!(is_eligible_for_send(&SendStatus::parse("correct")));
        assert!(is_eligible_for_send(&SendStatus::parse("")));
    }

    #[test]
    fn review_gate_is_case_insensitive() {
        assert!(is_eligible_for_review(&SendStatus::parse("Send")));
        assert!(!is_eligible_for_review(&SendStatus::parse("ERROR")));
        assert!(!is_eligible_for_review(&SendStatus::parse("correct")));
        assert!(is_eligible_for_review(&SendStatus::parse("")));
    }

    #[test]
    fn unknown_status_is_kept_and_eligible() {
        let status = SendStatus::parse(" nan ");
        assert_eq!(status, SendStatus::Other("nan".to_string()));
        assert_eq!(status.as_cell(), "nan");
        assert!(is_eligible_for_send(&status));
        assert!(is_eligible_for_review(&status));
    }

    #[test]
    fn correct_record_is_never_pending() {
        let t = today();
        let rec = record("111", t + Duration::days(2), "Correct");
        assert!(!is_pending_today(&rec, t));
        let rec = record("111", t + Duration::days(2), "");
        assert!(is_pending_today(&rec, t));
    }

    #[test]
    fn outcome_sets_status_and_timestamp() {
        let t = today();
        let mut ok = record("111", t + Duration::days(2), "");
        apply_outcome(&mut ok, &DeliveryOutcome::Delivered, t);
        assert_eq!(ok.status, SendStatus::Correct);
        assert_eq!(ok.timestep, Some(t));

        let mut missing = record("222", t + Duration::days(2), "");
        apply_outcome(&mut missing, &DeliveryOutcome::NotFound("x".into()), t);
        assert_eq!(missing.status, SendStatus::Error);
        assert_eq!(missing.timestep, Some(t));

        let mut failed = record("333", t + Duration::days(2), "");
        apply_outcome(&mut failed, &DeliveryOutcome::Failed("boom".into()), t);
        assert_eq!(failed.status.as_cell(), "Error");
    }
}
