// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::errors::*;
    use crate::domain::model::*;

    fn segment(id: usize, from: f64, to: f64) -> Segment {
        Segment {
            id,
            from_seconds: from,
            to_seconds: to,
            output_name: format!("clip-{}.mp4", id + 1),
            status: SegmentStatus::Pending,
        }
    }

    #[test]
    fn test_split_interval_bounds() {
        assert_eq!(SplitInterval::new(1).unwrap().minutes(), 1);
        assert_eq!(SplitInterval::new(60).unwrap().minutes(), 60);
        assert!(matches!(
            SplitInterval::new(0),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(SplitInterval::new(61).is_err());
    }

    #[test]
    fn test_split_interval_default_and_seconds() {
        let interval = SplitInterval::default();
        assert_eq!(interval.minutes(), 30);
        assert_eq!(interval.seconds(), 1800);
        assert_eq!(format!("{}", interval), "30 min");
    }

    #[test]
    fn test_split_interval_deserialize_validates() {
        let ok: SplitInterval = serde_json::from_str("15").unwrap();
        assert_eq!(ok.minutes(), 15);
        assert!(serde_json::from_str::<SplitInterval>("90").is_err());
    }

    #[test]
    fn test_media_source_duration() {
        assert!(MediaSource::new("a.mp4", 12.5, "a.mp4").has_duration());
        assert!(!MediaSource::new("a.mp4", 0.0, "a.mp4").has_duration());
        assert!(!MediaSource::new("a.mp4", f64::NAN, "a.mp4").has_duration());
    }

    #[test]
    fn test_segment_number_and_duration() {
        let seg = segment(2, 120.0, 150.5);
        assert_eq!(seg.number(), 3);
        assert_eq!(seg.duration(), 30.5);
    }

    #[test]
    fn test_cut_request_for_segment() {
        let seg = segment(0, 0.0, 60.0);
        let cut = CutRequest::for_segment("clip.mp4", &seg);
        assert_eq!(cut.input_name, "clip.mp4");
        assert_eq!(cut.output_name, "clip-1.mp4");
        assert_eq!(cut.from_seconds, 0.0);
        assert_eq!(cut.to_seconds, 60.0);
    }

    #[test]
    fn test_plan_lookup() {
        let plan = SegmentPlan::new(
            "clip.mp4",
            "video/mp4",
            vec![segment(0, 0.0, 60.0), segment(1, 60.0, 90.0)],
        );
        assert_eq!(plan.len(), 2);
        assert!(!plan.is_empty());
        assert_eq!(plan.get(1).unwrap().to_seconds, 90.0);
        assert!(plan.get(2).is_none());
        assert!(SegmentPlan::default().is_empty());
    }

    #[test]
    fn test_lifecycle_event_serialization() {
        let event = LifecycleEvent::ProcessingFailed {
            segment_id: 1,
            reason: "boom".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "processing-failed");
        assert_eq!(json["segment_id"], 1);
        assert_eq!(json["reason"], "boom");

        let record = EventRecord::now(LifecycleEvent::LoadingStarted {
            name: "clip.mp4".to_string(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "loading-started");
        assert!(json["at"].is_string());
    }

    #[test]
    fn test_domain_error_segment_scope() {
        let err = DomainError::ProcessingFailure {
            segment_id: 4,
            reason: "cut failed".to_string(),
        };
        assert_eq!(err.segment_id(), Some(4));
        assert_eq!(format!("{}", err), "Segment 4 failed: cut failed");
        assert_eq!(DomainError::Busy.segment_id(), None);
    }
}
