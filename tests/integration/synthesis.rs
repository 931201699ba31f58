//! Synthesis against the mock endpoint

use crate::mock_server::{long_text, mono_16k, wav_bytes, MockServerFixture, TTS_PATH};
use hound::WavReader;
use mockito::Matcher;
use viet_tts::config::DEFAULT_USER_AGENT;
use viet_tts::{AudioFormat, Dialect, EngineState, ErrorKind, TtsClient};

#[test]
fn test_short_text_single_fetch_writes_body_verbatim() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let body = b"\xFF\xF3\x44\xC4fake-mp3-frames".to_vec();

    let mock = fixture
        .server
        .mock("GET", TTS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ie".into(), "UTF-8".into()),
            Matcher::UrlEncoded("q".into(), "Xin chào.".into()),
            Matcher::UrlEncoded("tl".into(), "vi".into()),
            Matcher::UrlEncoded("client".into(), "tw-ob".into()),
        ]))
        .match_header("user-agent", DEFAULT_USER_AGENT)
        .with_status(200)
        .with_body(&body)
        .expect(1)
        .create();

    let client = fixture.client(scratch.path());
    let out = scratch.path().join("xin_chao.mp3");
    let report = client
        .synthesize_to_file("Xin chào", &out, Dialect::North)
        .expect("synthesis succeeds");

    mock.assert();
    assert_eq!(report.text, "Xin chào.");
    assert_eq!(report.segments, 1);
    assert_eq!(report.format, AudioFormat::Mp3);
    assert!(!report.is_partial());
    assert_eq!(std::fs::read(&out).unwrap(), body);
}

#[test]
fn test_dialect_does_not_change_request() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let mock = fixture.mock_audio(b"ID3audio", 3);

    let client = fixture.client(scratch.path());
    for dialect in Dialect::ALL {
        let out = scratch.path().join(format!("{dialect}.mp3"));
        assert!(client.generate_audio("Chào buổi sáng", &out, dialect));
    }
    mock.assert();
}

#[test]
fn test_long_text_fetches_once_per_sentence_and_merges_in_order() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let (text, sentences) = long_text();

    let mocks = vec![
        fixture.mock_segment(sentences[0], 200, &wav_bytes(mono_16k(), 0..100)),
        fixture.mock_segment(sentences[1], 200, &wav_bytes(mono_16k(), 100..300)),
        fixture.mock_segment(sentences[2], 200, &wav_bytes(mono_16k(), 300..350)),
    ];

    let client = fixture.client(scratch.path());
    let out = out_dir.path().join("merged.wav");
    let report = client
        .synthesize_to_file(&text, &out, Dialect::South)
        .expect("synthesis succeeds");

    for mock in &mocks {
        mock.assert();
    }
    assert_eq!(report.segments, 3);
    assert_eq!(report.fetched, vec![0, 1, 2]);
    assert_eq!(report.format, AudioFormat::Wav);

    let mut reader = WavReader::open(&out).unwrap();
    assert_eq!(reader.spec(), mono_16k());
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, (0..350).collect::<Vec<i16>>());
    assert!((client.audio_duration(&out) - 350.0 / 16_000.0).abs() < 1e-9);

    // Segment scratch files are gone.
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_segment_is_dropped_and_reported() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let (text, sentences) = long_text();

    let _ok_first = fixture.mock_segment(sentences[0], 200, &wav_bytes(mono_16k(), 0..10));
    let _failing = fixture.mock_segment(sentences[1], 500, b"boom");
    let _ok_last = fixture.mock_segment(sentences[2], 200, &wav_bytes(mono_16k(), 10..20));

    let client = fixture.client(scratch.path());
    let out = out_dir.path().join("partial.wav");
    let report = client
        .synthesize_to_file(&text, &out, Dialect::North)
        .expect("partial synthesis still succeeds");

    assert!(report.is_partial());
    assert_eq!(report.fetched, vec![0, 2]);
    assert_eq!(report.dropped, vec![1]);

    let mut reader = WavReader::open(&out).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, (0..20).collect::<Vec<i16>>());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_all_segments_failing_yields_no_audio() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let (text, _) = long_text();
    let mock = fixture.mock_status(503, 3);

    let client = fixture.client(scratch.path());
    let out = scratch.path().join("never.wav");
    let err = client
        .synthesize_to_file(&text, &out, Dialect::North)
        .unwrap_err();

    mock.assert();
    assert_eq!(err.kind(), ErrorKind::NoAudio);
    assert_eq!(err.status(), Some(503));
    assert!(!out.exists());
}

#[test]
fn test_rejected_request_surfaces_status() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let _mock = fixture.mock_status(403, 2);

    let client = fixture.client(scratch.path());
    let out = scratch.path().join("rejected.mp3");
    let err = client
        .synthesize_to_file("Xin chào", &out, Dialect::North)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.status(), Some(403));
    assert!(!client.generate_audio("Xin chào", &out, Dialect::North));
}

#[test]
fn test_mismatched_segments_are_not_merged() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let (text, sentences) = long_text();
    let stereo = hound::WavSpec {
        channels: 2,
        ..mono_16k()
    };

    let _a = fixture.mock_segment(sentences[0], 200, &wav_bytes(mono_16k(), 0..10));
    let _b = fixture.mock_segment(sentences[1], 200, &wav_bytes(stereo, 0..10));
    let _c = fixture.mock_segment(sentences[2], 200, &wav_bytes(mono_16k(), 0..10));

    let client = fixture.client(scratch.path());
    let err = client
        .synthesize_to_file(&text, out_dir.path().join("bad.wav"), Dialect::North)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatMismatch);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_concurrent_chunked_calls_do_not_clobber() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let (text, _) = long_text();
    let _mock = fixture.mock_audio(&wav_bytes(mono_16k(), 0..50), 6);

    let client = fixture.client(scratch.path());
    std::thread::scope(|s| {
        for i in 0..2 {
            let client = &client;
            let text = &text;
            let out = out_dir.path().join(format!("out_{i}.wav"));
            s.spawn(move || {
                let report = client
                    .synthesize_to_file(text, &out, Dialect::North)
                    .expect("synthesis succeeds");
                assert_eq!(report.fetched.len(), 3);
                assert_eq!(WavReader::open(&out).unwrap().duration(), 150);
            });
        }
    });
}

#[test]
fn test_unavailable_client_makes_no_requests() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let mock = fixture.mock_audio(b"ID3", 0);

    let client = TtsClient::with_state(
        fixture.config(scratch.path()),
        EngineState::unavailable(fixture.base_url.clone()),
    )
    .unwrap();
    let out = scratch.path().join("out.mp3");

    assert!(!client.is_available());
    assert!(!client.generate_audio("Xin chào", &out, Dialect::North));
    assert!(!client.speak_text("Xin chào", Dialect::North));
    assert!(!client.test_voice(Dialect::South));
    assert!(client.available_voices().is_empty());
    assert_eq!(client.audio_duration(&out), 0.0);
    client.cleanup();

    mock.assert();
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_long_punctuation_only_text_is_empty() {
    let mut fixture = MockServerFixture::new();
    let scratch = tempfile::tempdir().unwrap();
    let mock = fixture.mock_audio(b"ID3", 0);

    let client = fixture.client(scratch.path());
    let out = scratch.path().join("dots.mp3");
    let err = client
        .synthesize_to_file(&".".repeat(250), &out, Dialect::North)
        .unwrap_err();

    mock.assert();
    assert_eq!(err.kind(), ErrorKind::EmptyText);
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
