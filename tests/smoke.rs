use raydesk_input::Hand;
use raydesk_testkit::{EventRecord, JsonlSink, OverlayEvent};

#[test]
fn overlay_event_stream_can_be_written() {
    let mut sink = JsonlSink::create(std::env::temp_dir().join("raydesk_eventlog.jsonl"))
        .expect("can create temp log");
    let record = EventRecord {
        frame: 1,
        overlay: "smoke".into(),
        event: OverlayEvent::Grabbed { hand: Hand::Left },
    };
    sink.write(&record).expect("can write event");
}
