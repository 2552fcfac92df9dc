use super::{
    FeedDecodeError, FeedError, FeedFormat, FileFeedSource, StubFeedSource, TransportError,
    block_on_for_tests, decode_feed, fetch_crossings,
};
use border_wait_core::{LaneSlot, RawCrossing, normalize};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use serde_json::Value;
use std::fs;

#[fixture]
fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(dir: &Utf8PathBuf, name: &str) -> Vec<u8> {
    let path = dir.join(name);
    fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture {path}: {err}"))
}

#[fixture]
fn xml_feed(#[from(fixtures_dir)] dir: Utf8PathBuf) -> Vec<RawCrossing> {
    decode_feed(&read_fixture(&dir, "bwt_sample.xml")).expect("sample XML should decode")
}

#[fixture]
fn json_feed(#[from(fixtures_dir)] dir: Utf8PathBuf) -> Vec<RawCrossing> {
    decode_feed(&read_fixture(&dir, "bwt_legacy.json")).expect("legacy JSON should decode")
}

#[rstest]
fn decodes_every_port_in_feed_order(xml_feed: Vec<RawCrossing>) {
    let codes: Vec<_> = xml_feed
        .iter()
        .map(|port| port["port_number"].as_str().expect("port number text"))
        .collect();
    assert_eq!(codes, ["250401", "250407", "070801"]);
}

#[rstest]
fn empty_elements_decode_as_null(xml_feed: Vec<RawCrossing>) {
    let fast = &xml_feed[0]["commercial_vehicle_lanes"]["FAST_lanes"];
    assert_eq!(fast["delay_minutes"], Value::Null);
    assert_eq!(xml_feed[2]["crossing_name"], Value::Null);
}

#[rstest]
fn revisions_decode_to_equivalent_records(
    xml_feed: Vec<RawCrossing>,
    json_feed: Vec<RawCrossing>,
) {
    let from_xml = normalize(&xml_feed[0]);
    let from_json = normalize(&json_feed[0]);
    assert_eq!(from_xml.details, from_json.details);
    assert_eq!(from_xml.lanes, from_json.lanes);
    assert_eq!(
        (&from_xml.date, &from_xml.time),
        (&from_json.date, &from_json.time)
    );
    let sentri = from_json
        .lane(LaneSlot::PassengerSentri)
        .expect("sentri slot");
    assert_eq!(sentri.delay_minutes, Some(0));
}

#[rstest]
#[case(b"<border_wait_time><port><port_number>1</port_number></port></border_wait_time>".as_slice(), 1)]
#[case(b"<border_wait_time><last_updated_date>2026-10-19</last_updated_date></border_wait_time>".as_slice(), 0)]
#[case(b"<border_wait_time/>".as_slice(), 0)]
#[case(br#"[{"port_code": "1"}, {"port_code": "2"}]"#.as_slice(), 2)]
#[case(br#"{"port": {"port_code": "1"}}"#.as_slice(), 1)]
#[case(br#"{"port_code": "1", "port_name": "Otay Mesa"}"#.as_slice(), 1)]
fn accepts_known_layouts(#[case] payload: &[u8], #[case] expected: usize) {
    let crossings = decode_feed(payload).expect("layout should decode");
    assert_eq!(crossings.len(), expected);
}

#[rstest]
fn strips_byte_order_mark() {
    let payload = b"\xEF\xBB\xBF<border_wait_time><port><port_number>1</port_number></port></border_wait_time>";
    assert_eq!(FeedFormat::sniff(payload), Some(FeedFormat::Xml));
    assert_eq!(decode_feed(payload).expect("decode").len(), 1);
}

#[rstest]
fn rejects_empty_payload() {
    assert!(matches!(decode_feed(b"  \n"), Err(FeedDecodeError::Empty)));
}

#[rstest]
fn rejects_malformed_xml() {
    let err = decode_feed(b"<border_wait_time><port>").expect_err("unterminated XML");
    assert!(matches!(err, FeedDecodeError::Xml { .. }));
}

#[rstest]
fn rejects_malformed_json() {
    let err = decode_feed(b"{\"port\": [").expect_err("unterminated JSON");
    assert!(matches!(err, FeedDecodeError::Json { .. }));
}

#[rstest]
fn rejects_documents_without_ports() {
    let err = decode_feed(br#"{"status": "maintenance"}"#).expect_err("no ports");
    assert!(matches!(err, FeedDecodeError::MissingPorts));
}

#[rstest]
#[case(b"[{\"port_code\": \"1\"}, 7]".as_slice(), 1, "a number")]
#[case(b"[{\"port_code\": \"1\"}, \"2\"]".as_slice(), 1, "a string")]
fn rejects_non_mapping_ports(
    #[case] payload: &[u8],
    #[case] expected_index: usize,
    #[case] expected_type: &str,
) {
    match decode_feed(payload) {
        Err(FeedDecodeError::InvalidPort { index, found }) => {
            assert_eq!(index, expected_index);
            assert_eq!(found, expected_type);
        }
        other => panic!("expected invalid port error, got {other:?}"),
    }
}

#[rstest]
fn empty_port_element_keeps_its_neighbours() {
    let payload = b"<border_wait_time>\
        <port><port_number>250401</port_number></port>\
        <port/>\
        <port><port_number>070801</port_number></port>\
        </border_wait_time>";
    let crossings = decode_feed(payload).expect("empty port should not fail the feed");
    assert_eq!(crossings.len(), 3);
    assert!(crossings[1].is_empty());
    let blank = normalize(&crossings[1]);
    assert_eq!(blank.details.port_code, "");
    assert_eq!(crossings[2]["port_number"], "070801");
}

#[rstest]
fn fetches_and_decodes_from_source() {
    let source = StubFeedSource::with_payload(r#"[{"port_code": "250401"}]"#);
    let crossings = block_on_for_tests(fetch_crossings(&source)).expect("fetch should succeed");
    assert_eq!(crossings.len(), 1);
}

#[rstest]
fn transport_failure_fails_the_fetch() {
    let source = StubFeedSource::with_status(503);
    let err = block_on_for_tests(fetch_crossings(&source)).expect_err("fetch should fail");
    assert!(matches!(
        err,
        FeedError::Fetch {
            source: TransportError::Http { status: 503, .. }
        }
    ));
}

#[rstest]
fn decode_failure_names_the_location() {
    let source = StubFeedSource::with_payload("<html>maintenance");
    let err = block_on_for_tests(fetch_crossings(&source)).expect_err("decode should fail");
    match err {
        FeedError::Decode { location, .. } => assert_eq!(location, "stub://feed"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[rstest]
fn reads_saved_snapshot(#[from(fixtures_dir)] dir: Utf8PathBuf) {
    let source = FileFeedSource::new(dir.join("bwt_sample.xml"));
    let crossings = block_on_for_tests(fetch_crossings(&source)).expect("snapshot should load");
    assert_eq!(crossings.len(), 3);
}

#[rstest]
fn missing_snapshot_is_a_transport_error(#[from(fixtures_dir)] dir: Utf8PathBuf) {
    let source = FileFeedSource::new(dir.join("absent.xml"));
    let err = block_on_for_tests(fetch_crossings(&source)).expect_err("missing snapshot");
    assert!(matches!(
        err,
        FeedError::Fetch {
            source: TransportError::ReadFile { .. }
        }
    ));
}
