use minifyd::protocol::LineTag;

#[test]
fn tags_round_trip_through_split() {
    for tag in [
        LineTag::DebugMessage,
        LineTag::WatchUpdate,
        LineTag::WatchError,
        LineTag::SetIsWatching,
    ] {
        let line = format!("{} some payload text", tag.as_str());
        let (parsed, rest) = LineTag::split(&line).unwrap();
        assert_eq!(parsed, tag);
        assert_eq!(rest, "some payload text");
    }
}

#[test]
fn unknown_tags_are_rejected() {
    assert!(LineTag::split("status ok").is_none());
    assert!(LineTag::split("").is_none());
    // A bare tag with no payload still parses.
    let (tag, rest) = LineTag::split("set-is-watching").unwrap();
    assert_eq!(tag, LineTag::SetIsWatching);
    assert_eq!(rest, "");
}
