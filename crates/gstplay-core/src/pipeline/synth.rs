//! Description synthesis for each decode path

use super::{Branch, BranchRole, Chain, Element, PadRef, PipelineDescription};
use crate::config::PlayerConfig;
use crate::resolve::{Locator, ResolvedSource};
use crate::types::{DecodePath, PlayFlags, SinkSelection};
use tracing::debug;

const DEMUXER_NAME: &str = "demuxer";
const DECODER_NAME: &str = "decoder";
const PLAYBIN_NAME: &str = "playbin";

/// Inputs to synthesis that come from the framework rather than the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// The framework can apply colour balance in software
    pub software_color_balance_supported: bool,
}

/// Flags for the default path.
///
/// Starts from [`PlayFlags::BASE`], then drops audio in video-only mode,
/// software volume when disabled, and software colour balance when either
/// disabled or unsupported.
pub fn playbin_flags(config: &PlayerConfig, options: SynthesisOptions) -> PlayFlags {
    let mut flags = PlayFlags::BASE;
    if config.video_only {
        flags.remove(PlayFlags::AUDIO | PlayFlags::SOFT_VOLUME);
    }
    if !config.software_volume {
        flags.remove(PlayFlags::SOFT_VOLUME);
    }
    if !config.software_color_balance || !options.software_color_balance_supported {
        flags.remove(PlayFlags::SOFT_COLORBALANCE);
    }
    flags
}

/// Build the launch description for `source` under `config`
pub fn synthesize(
    source: &ResolvedSource,
    config: &PlayerConfig,
    options: SynthesisOptions,
) -> PipelineDescription {
    let description = match config.decode_path {
        DecodePath::Playbin => playbin(source, config, options),
        DecodePath::Decodebin => decodebin(source, config),
        DecodePath::Mp4Avi => demux_decode(source, config, "avidemux", "avdec_mpeg4"),
        DecodePath::Mp4Qt => demux_decode(source, config, "qtdemux", "avdec_mpeg4"),
        DecodePath::H264Qt => demux_decode(source, config, "qtdemux", "avdec_h264"),
        DecodePath::MsMp4Avi => demux_decode(source, config, "avidemux", "avdec_msmpeg4v2"),
    };

    debug!(
        decode_path = %config.decode_path,
        description = %description,
        "Pipeline description synthesized"
    );
    description
}

fn playbin(
    source: &ResolvedSource,
    config: &PlayerConfig,
    options: SynthesisOptions,
) -> PipelineDescription {
    let flags = playbin_flags(config, options);
    let video_sink = config.sinks.video.trim();

    let mut playbin = Element::new("playbin")
        .named(PLAYBIN_NAME)
        .property("uri", source.locator.as_str())
        .property("video-sink", video_sink);
    if !config.video_only {
        playbin = playbin.property("audio-sink", config.sinks.audio.trim());
    } else if video_sink != SinkSelection::NULL {
        playbin = playbin.property("audio-sink", SinkSelection::NULL);
    }
    // A null video sink leaves audio-sink unset; the cleared audio flag
    // keeps playbin from rendering audio at all

    PipelineDescription::playbin(playbin.property("flags", flags))
}

fn decodebin(source: &ResolvedSource, config: &PlayerConfig) -> PipelineDescription {
    let main = Chain::new()
        .then(source_element(&source.locator))
        .then(Element::new("decodebin").named(DECODER_NAME));
    let video = Chain::from_pad(PadRef::any(DECODER_NAME)).then(Element::new("queue"));

    PipelineDescription::chains(vec![
        Branch::enabled(BranchRole::Main, main),
        Branch::enabled(BranchRole::Video, video_sink_stage(video, &config.sinks)),
        audio_branch(config, PadRef::any(DECODER_NAME), false),
    ])
}

fn demux_decode(
    source: &ResolvedSource,
    config: &PlayerConfig,
    demuxer: &str,
    decoder: &str,
) -> PipelineDescription {
    let main = Chain::new()
        .then(source_element(&source.locator))
        .then(Element::new(demuxer).named(DEMUXER_NAME));
    let video = Chain::from_pad(PadRef::pad(DEMUXER_NAME, "video_0"))
        .then(Element::new("queue"))
        .then(Element::new(decoder));

    PipelineDescription::chains(vec![
        Branch::enabled(BranchRole::Main, main),
        Branch::enabled(BranchRole::Video, video_sink_stage(video, &config.sinks)),
        audio_branch(config, PadRef::pad(DEMUXER_NAME, "audio_0"), true),
    ])
}

fn source_element(locator: &Locator) -> Element {
    match locator {
        Locator::File { path, .. } => {
            Element::new("filesrc").property("location", path.display())
        }
        Locator::Remote(uri) => Element::new("urisourcebin").property("uri", uri),
    }
}

/// Append the video sink, converting first for the basic image sink
fn video_sink_stage(chain: Chain, sinks: &SinkSelection) -> Chain {
    chain
        .then_if(sinks.video_needs_conversion(), Element::new("videoconvert"))
        .then(Element::verbatim(sinks.video.as_str()))
}

/// Audio branch, or an empty slot in video-only mode. Demuxed audio is still
/// compressed and gets a decodebin of its own.
fn audio_branch(config: &PlayerConfig, from: PadRef, compressed: bool) -> Branch {
    if config.video_only {
        return Branch::disabled(BranchRole::Audio);
    }

    let chain = Chain::from_pad(from)
        .then(Element::new("queue"))
        .then_if(compressed, Element::new("decodebin"))
        .then(Element::new("audioconvert"))
        .then(Element::new("audioresample"))
        .then(Element::verbatim(config.sinks.audio.as_str()));
    Branch::enabled(BranchRole::Audio, chain)
}
