//! Mock TTS endpoint for integration tests

use hound::{SampleFormat, WavSpec, WavWriter};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::io::Cursor;
use std::path::Path;
use viet_tts::{EngineState, Player, TtsClient, TtsConfig};

pub const TTS_PATH: &str = "/translate_tts";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub fn new() -> Self {
        let server = Server::new();
        let base_url = format!("{}{}", server.url(), TTS_PATH);
        Self { server, base_url }
    }

    /// Config pointing both the endpoint and the probe at the mock server.
    pub fn config(&self, scratch: &Path) -> TtsConfig {
        TtsConfig::default()
            .with_base_url(self.base_url.clone())
            .with_probe_url(format!("{}/", self.server.url()))
            .with_temp_dir(scratch)
    }

    /// Client with an injected available state; no probe request is made.
    pub fn client(&self, scratch: &Path) -> TtsClient {
        TtsClient::with_state(self.config(scratch), EngineState::available(self.base_url.clone()))
            .expect("build client")
    }

    pub fn client_with_player(&self, scratch: &Path, player: impl Player + 'static) -> TtsClient {
        TtsClient::builder()
            .config(self.config(scratch))
            .state(EngineState::available(self.base_url.clone()))
            .player(player)
            .build()
            .expect("build client")
    }

    /// Answer every synthesis request with `body`, expecting `hits` calls.
    pub fn mock_audio(&mut self, body: &[u8], hits: usize) -> Mock {
        self.server
            .mock("GET", TTS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .expect(hits)
            .create()
    }

    /// Answer requests for one segment text only.
    pub fn mock_segment(&mut self, text: &str, status: usize, body: &[u8]) -> Mock {
        self.server
            .mock("GET", TTS_PATH)
            .match_query(Matcher::UrlEncoded("q".into(), text.into()))
            .with_status(status)
            .with_body(body)
            .expect(1)
            .create()
    }

    pub fn mock_status(&mut self, status: usize, hits: usize) -> Mock {
        self.server
            .mock("GET", TTS_PATH)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body("rejected")
            .expect(hits)
            .create()
    }

    pub fn mock_probe(&mut self, status: usize) -> Mock {
        self.server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(status)
            .create()
    }
}

pub fn mono_16k() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// In-memory WAV file holding the given samples.
pub fn wav_bytes(spec: WavSpec, samples: impl IntoIterator<Item = i16>) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("wav writer");
        for s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Three sentences, long enough together to take the chunked path.
pub fn long_text() -> (String, Vec<&'static str>) {
    let sentences = vec![
        "Hôm nay trời Hà Nội rất đẹp và chúng tôi quyết định đi dạo quanh hồ Hoàn Kiếm vào buổi sáng sớm",
        "Sau đó cả nhóm ghé vào một quán phở nhỏ trên phố cổ để thưởng thức bữa sáng nóng hổi",
        "Buổi chiều chúng tôi tham quan Văn Miếu và chụp rất nhiều ảnh kỷ niệm cùng bạn bè",
    ];
    let text = format!("{}. {}. {}.", sentences[0], sentences[1], sentences[2]);
    assert!(text.chars().count() > 200);
    (text, sentences)
}
