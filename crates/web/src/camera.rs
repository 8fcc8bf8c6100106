//! Media stream plumbing for the camera modal

use checklist_form::MediaConstraints;
use image::RgbaImage;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use crate::dom;
use crate::error::WebError;

/// Ask for a stream and start playing it in `video`
pub async fn open_stream(video: &HtmlVideoElement, constraints: &MediaConstraints) -> Result<MediaStream, WebError> {
    let json = constraints
        .to_json()
        .map_err(|e| WebError::Js(e.to_string()))?;
    let constraints: MediaStreamConstraints = js_sys::JSON::parse(&json)?.unchecked_into();

    let devices = dom::window()?.navigator().media_devices()?;
    let promise = devices.get_user_media_with_constraints(&constraints)?;
    let stream: MediaStream = JsFuture::from(promise).await?.dyn_into()?;

    video.set_src_object(Some(&stream));
    JsFuture::from(video.play()?).await?;
    Ok(stream)
}

/// Stop every track and detach the stream from `video`
pub fn close_stream(stream: Option<MediaStream>, video: Option<&HtmlVideoElement>) {
    if let Some(stream) = stream {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
    if let Some(video) = video {
        video.set_src_object(None);
    }
}

/// Current video frame as RGBA pixels; empty if the video has no size yet
pub fn grab_frame(video: &HtmlVideoElement) -> Result<RgbaImage, WebError> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Ok(RgbaImage::new(0, 0));
    }

    let canvas: HtmlCanvasElement = dom::document()?.create_element("canvas")?.unchecked_into();
    canvas.set_width(width);
    canvas.set_height(height);
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(WebError::MissingContext)?
        .unchecked_into();

    context.draw_image_with_html_video_element(video, 0.0, 0.0)?;
    let pixels = context.get_image_data(0.0, 0.0, width as f64, height as f64)?;
    RgbaImage::from_raw(width, height, pixels.data().0)
        .ok_or_else(|| WebError::Js("frame size mismatch".to_string()))
}
