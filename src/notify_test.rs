use super::*;

#[test]
fn recording_keeps_order_and_level() {
    let notifier = RecordingNotifier::new();
    notifier.error("first");
    notifier.success("second");
    notifier.notify(NotificationLevel::Warning, "third");

    let seen = notifier.notifications();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], Notification { level: NotificationLevel::Error, message: "first".into() });
    assert_eq!(seen[1].level, NotificationLevel::Success);
    assert_eq!(notifier.messages(), vec!["first", "second", "third"]);
}

#[test]
fn notifiers_are_object_safe() {
    let sinks: Vec<Box<dyn Notifier>> = vec![Box::new(TracingNotifier), Box::new(RecordingNotifier::new())];
    for sink in &sinks {
        sink.error("network down");
    }
}
