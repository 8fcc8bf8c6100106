//! Page wiring
//!
//! Everything is looked up and bound once in [`run`]. Handlers share the
//! application state through `Rc<RefCell<App>>` and never hold a borrow
//! across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use checklist_config::AppConfig;
use checklist_form::report::export_with_notice;
use checklist_form::share::share_with_notice;
use checklist_form::theme::{change_theme, load_theme};
use checklist_form::{messages, ChecklistForm, Notice, PhotoSlot};
use signature::StrokeCapture;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlVideoElement, KeyboardEvent, MediaStream, PointerEvent,
};

use crate::camera::{close_stream, grab_frame, open_stream};
use crate::canvas::{DomCanvas, SignatureView};
use crate::dom;
use crate::error::{describe_js, WebError};
use crate::personnel::{parse_index, reindex, INDEX_ATTRIBUTE};
use crate::resize::{resize_step, ResizeStep};
use crate::share::{BrowserShare, PrintRenderer};
use crate::storage::LocalStore;

const CONFIG_ELEMENT_ID: &str = "checklistConfig";
const RESET_CONFIRMATION: &str = "¿Estás seguro de que quieres limpiar todo el formulario?";
const PERSONNEL_INPUT_SELECTOR: &str = "input[name=\"personal[]\"]";
const PERSONNEL_PLACEHOLDER: &str = "Nombre del personal";
const PERSONNEL_FIRST_ROW: &str = r#"<div class="personal-item">
    <input type="text" name="personal[]" placeholder="Nombre del personal" data-index="0">
    <button type="button" class="btn-primary" onclick="addPersonal()">
        <i class="fas fa-plus"></i>
    </button>
</div>"#;

pub struct App {
    form: ChecklistForm<DomCanvas>,
    view: Option<SignatureView>,
    store: LocalStore,
    stream: Option<MediaStream>,
    resize_timer: Option<i32>,
    notice_ms: u32,
}

type Shared = Rc<RefCell<App>>;

impl App {
    /// Copy freshly drawn signature pixels to the page
    fn present_signature(&mut self) {
        let (Some(view), Some(surface)) = (self.view.as_ref(), self.form.signature_mut()) else {
            return;
        };
        if let Err(e) = view.present(surface.capture_mut()) {
            error!("Failed to draw signature: {}", e);
        }
    }

    fn sync_signature(&mut self) {
        let (Some(view), Some(surface)) = (self.view.as_ref(), self.form.signature_mut()) else {
            return;
        };
        if let Err(e) = view.sync(surface.capture_mut()) {
            error!("Failed to redraw signature: {}", e);
        }
    }
}

fn notify(app: &Shared, notice: &Notice) {
    let display_ms = app.borrow().notice_ms;
    if let Ok(document) = dom::document() {
        dom::show_notice(&document, notice, display_ms);
    }
}

fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) -> Result<(), WebError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen_by_id(document: &Document, id: &str, event: &str, handler: impl FnMut(Event) + 'static) -> Result<(), WebError> {
    match document.get_element_by_id(id) {
        Some(element) => listen(&element, event, handler),
        None => Ok(()),
    }
}

/// Make `handler` callable from inline `onclick` attributes
fn expose(name: &str, handler: impl FnMut(JsValue) + 'static) -> Result<(), WebError> {
    let window = dom::window()?;
    let closure = Closure::<dyn FnMut(JsValue)>::new(handler);
    js_sys::Reflect::set(&window, &JsValue::from_str(name), closure.as_ref())?;
    closure.forget();
    Ok(())
}

/// Configuration from an optional inline JSON element
fn load_config(document: &Document) -> AppConfig {
    let Some(json) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return AppConfig::default();
    };
    AppConfig::from_json(&json).unwrap_or_else(|e| {
        error!("Ignoring invalid configuration: {}", e);
        AppConfig::default()
    })
}

/// The single initialization pass
pub fn run() -> Result<(), WebError> {
    let document = dom::document()?;
    let config = load_config(&document);
    let notice_ms = config.notice.display_ms;

    let canvas = dom::find_element::<HtmlCanvasElement>(&document, "signaturePad");
    let view = match canvas.as_ref().map(|c| SignatureView::new(c.clone())) {
        Some(Ok(view)) => Some(view),
        Some(Err(e)) => {
            error!("Signature canvas unusable: {}", e);
            None
        }
        None => None,
    };
    let form = ChecklistForm::new(config, view.as_ref().and(canvas.clone()).map(DomCanvas::new));

    let app = Rc::new(RefCell::new(App {
        form,
        view,
        store: LocalStore::open(),
        stream: None,
        resize_timer: None,
        notice_ms,
    }));
    app.borrow_mut().sync_signature();

    wire_theme(&app, &document)?;
    if let Some(canvas) = canvas {
        wire_signature(&app, &document, &canvas)?;
    }
    wire_fields(&app, &document)?;
    wire_personnel(&app, &document)?;
    wire_photos(&app, &document)?;
    wire_camera(&app, &document)?;
    wire_reset(&app, &document)?;
    wire_share(&app)?;

    info!("Checklist initialized");
    Ok(())
}

fn wire_theme(app: &Shared, document: &Document) -> Result<(), WebError> {
    let Some(root) = document
        .document_element()
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };

    let vars = {
        let state = app.borrow();
        load_theme(&state.store, &state.form.config().theme)
    };

    for var in vars {
        let Some(input) = dom::find_element::<HtmlInputElement>(document, var.key.storage_key()) else {
            continue;
        };
        input.set_value(&var.value);
        root.style().set_property(var.property(), &var.value)?;

        let key = var.key;
        let app = app.clone();
        let root = root.clone();
        let field = input.clone();
        listen(&input, "input", move |_| {
            let value = field.value();
            let (var, saved) = change_theme(&mut app.borrow_mut().store, key, &value);
            let _ = root.style().set_property(var.property(), &var.value);
            if let Err(e) = saved {
                error!("Failed to save {}: {}", key.storage_key(), e);
            }
        })?;
    }
    Ok(())
}

fn wire_signature(app: &Shared, document: &Document, canvas: &HtmlCanvasElement) -> Result<(), WebError> {
    let dom_canvas = DomCanvas::new(canvas.clone());

    {
        let app = app.clone();
        let dom_canvas = dom_canvas.clone();
        listen(canvas, "pointerdown", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let _ = dom_canvas.element().set_pointer_capture(event.pointer_id());

            let point = dom_canvas.point_from_event(event);
            let mut state = app.borrow_mut();
            if let Some(surface) = state.form.signature_mut() {
                surface.begin_stroke(point);
            }
            state.present_signature();
        })?;
    }

    {
        let app = app.clone();
        let dom_canvas = dom_canvas.clone();
        listen(canvas, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let point = dom_canvas.point_from_event(event);
            let mut state = app.borrow_mut();
            let Some(surface) = state.form.signature_mut() else {
                return;
            };
            if !surface.capture().is_stroking() {
                return;
            }
            surface.continue_stroke(point);
            state.present_signature();
        })?;
    }

    for name in ["pointerup", "pointercancel"] {
        let app = app.clone();
        let dom_canvas = dom_canvas.clone();
        listen(canvas, name, move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let point = dom_canvas.point_from_event(event);
            let mut state = app.borrow_mut();
            let Some(surface) = state.form.signature_mut() else {
                return;
            };
            if !surface.capture().is_stroking() {
                return;
            }
            surface.end_stroke(Some(point));
            state.present_signature();
        })?;
    }

    {
        let app = app.clone();
        listen_by_id(document, "clearSignature", "click", move |_| {
            let notice = {
                let mut state = app.borrow_mut();
                let notice = state.form.clear_signature();
                state.present_signature();
                notice
            };
            if let Some(notice) = notice {
                notify(&app, &notice);
            }
        })?;
    }

    {
        let app = app.clone();
        listen_by_id(document, "changeColor", "click", move |_| {
            let notice = app.borrow_mut().form.toggle_pen_color();
            if let Some(notice) = notice {
                notify(&app, &notice);
            }
        })?;
    }

    let window = dom::window()?;
    let app = app.clone();
    listen(&window, "resize", move |_| schedule_resize(&app))?;
    Ok(())
}

/// Restart the quiet-period timer for a resize burst
fn schedule_resize(app: &Shared) {
    let delay = {
        let mut state = app.borrow_mut();
        if let Some(handle) = state.resize_timer.take() {
            dom::clear_timeout(handle);
        }
        let Some(surface) = state.form.signature_mut() else {
            return;
        };
        surface.on_resize_event(dom::now());
        surface.resize_quiet_period()
    };
    arm_resize_timer(app, delay);
}

fn arm_resize_timer(app: &Shared, delay: std::time::Duration) {
    let pending = app.clone();
    match dom::set_timeout(move || run_pending_resize(&pending), delay) {
        Ok(handle) => app.borrow_mut().resize_timer = Some(handle),
        Err(e) => error!("Failed to schedule resize: {}", e),
    }
}

fn run_pending_resize(app: &Shared) {
    let step = {
        let mut state = app.borrow_mut();
        state.resize_timer = None;
        let Some(surface) = state.form.signature_mut() else {
            return;
        };
        let step = resize_step(surface, dom::now());
        if step == ResizeStep::Redraw {
            state.sync_signature();
        }
        step
    };
    if let ResizeStep::Rearm(remaining) = step {
        arm_resize_timer(app, remaining);
    }
}

fn wire_fields(app: &Shared, document: &Document) -> Result<(), WebError> {
    for id in ["fecha", "departamento"] {
        let Some(input) = dom::find_element::<HtmlInputElement>(document, id) else {
            continue;
        };
        let app = app.clone();
        let field = input.clone();
        listen(&input, "input", move |_| {
            let mut state = app.borrow_mut();
            match id {
                "fecha" => state.form.set_fecha(field.value()),
                _ => state.form.set_departamento(field.value()),
            }
        })?;
    }
    Ok(())
}

fn personnel_inputs(document: &Document) -> Vec<HtmlInputElement> {
    let Ok(nodes) = document.query_selector_all(PERSONNEL_INPUT_SELECTOR) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

/// Keep each input's `data-index` equal to its position
fn renumber_personnel(document: &Document) {
    let inputs = personnel_inputs(document);
    let current: Vec<Option<String>> = inputs.iter().map(|input| input.get_attribute(INDEX_ATTRIBUTE)).collect();
    for (position, index) in reindex(&current) {
        let _ = inputs[position].set_attribute(INDEX_ATTRIBUTE, &index);
    }
}

fn input_index(input: &Element) -> Option<usize> {
    parse_index(input.get_attribute(INDEX_ATTRIBUTE).as_deref())
}

fn add_personnel_row(app: &Shared, document: &Document) -> Result<(), WebError> {
    let Some(list) = document.get_element_by_id("personalList") else {
        return Ok(());
    };

    let row = document.create_element("div")?;
    row.set_class_name("personal-item");

    let input: HtmlInputElement = document.create_element("input")?.unchecked_into();
    input.set_type("text");
    input.set_name("personal[]");
    input.set_placeholder(PERSONNEL_PLACEHOLDER);
    let index = app.borrow_mut().form.add_personnel();
    input.set_attribute(INDEX_ATTRIBUTE, &index.to_string())?;

    let button = document.create_element("button")?;
    button.set_attribute("type", "button")?;
    button.set_class_name("btn-danger");
    button.set_inner_html(r#"<i class="fas fa-minus"></i>"#);

    row.append_child(&input)?;
    row.append_child(&button)?;
    list.append_child(&row)?;
    let _ = input.focus();
    Ok(())
}

fn wire_personnel(app: &Shared, document: &Document) -> Result<(), WebError> {
    renumber_personnel(document);

    {
        let app = app.clone();
        expose("addPersonal", move |_| {
            if let Ok(document) = dom::document() {
                if let Err(e) = add_personnel_row(&app, &document) {
                    error!("Failed to add personnel row: {}", e);
                }
            }
        })?;
    }

    let Some(list) = document.get_element_by_id("personalList") else {
        return Ok(());
    };

    {
        let app = app.clone();
        listen(&list, "input", move |event| {
            let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            if let Some(index) = input_index(&input) {
                app.borrow_mut().form.set_personnel(index, input.value());
            }
        })?;
    }

    let app = app.clone();
    listen(&list, "click", move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(_)) = target.closest(".btn-danger") else {
            return;
        };
        let Ok(Some(row)) = target.closest(".personal-item") else {
            return;
        };
        let index = row
            .query_selector(PERSONNEL_INPUT_SELECTOR)
            .ok()
            .flatten()
            .and_then(|input| input_index(&input));

        row.remove();
        if let Some(index) = index {
            app.borrow_mut().form.remove_personnel(index);
        }
        if let Ok(document) = dom::document() {
            renumber_personnel(&document);
        }
    })?;
    Ok(())
}

fn wire_photos(app: &Shared, document: &Document) -> Result<(), WebError> {
    for slot in PhotoSlot::ALL {
        let suffix = slot.element_suffix();
        let Some(file_input) = dom::find_element::<HtmlInputElement>(document, &format!("fileInput{suffix}")) else {
            continue;
        };

        {
            let app = app.clone();
            let file_input = file_input.clone();
            listen_by_id(document, &format!("preview{suffix}"), "click", move |_| {
                if app.borrow().form.preview_click(slot) {
                    file_input.click();
                }
            })?;
        }

        {
            let file_input = file_input.clone();
            listen_by_id(document, &format!("choose{suffix}"), "click", move |event| {
                event.stop_propagation();
                file_input.click();
            })?;
        }

        let app = app.clone();
        let field = file_input.clone();
        listen(&file_input, "change", move |_| {
            let Some(file) = field.files().and_then(|files| files.get(0)) else {
                return;
            };
            let app = app.clone();
            spawn_local(async move {
                let mime = file.type_();
                let bytes = match JsFuture::from(file.array_buffer()).await {
                    Ok(buffer) => js_sys::Uint8Array::new(&buffer).to_vec(),
                    Err(e) => {
                        error!("Error reading file: {}", describe_js(&e));
                        notify(&app, &Notice::error(messages::IMAGE_LOAD_FAILED));
                        return;
                    }
                };

                let notice = app.borrow_mut().form.select_photo_file(slot, &mime, bytes);
                if !notice.is_error() {
                    show_slot_preview(&app, slot);
                }
                notify(&app, &notice);
            });
        })?;
    }
    Ok(())
}

fn show_slot_preview(app: &Shared, slot: PhotoSlot) {
    let Some(url) = app.borrow().form.photos().get(slot).map(str::to_string) else {
        return;
    };
    let result = dom::document().and_then(|document| dom::set_preview(&document, slot, &url));
    if let Err(e) = result {
        error!("Failed to show preview: {}", e);
        notify(app, &Notice::error(messages::IMAGE_LOAD_FAILED));
    }
}

fn set_modal_hidden(hidden: bool) {
    let Some(modal) = dom::document()
        .ok()
        .and_then(|d| d.get_element_by_id("cameraModal"))
    else {
        return;
    };
    let classes = modal.class_list();
    let _ = if hidden {
        classes.add_1("hidden")
    } else {
        classes.remove_1("hidden")
    };
}

fn camera_video() -> Option<HtmlVideoElement> {
    dom::find_element(&dom::document().ok()?, "cameraVideo")
}

fn stop_camera(app: &Shared) {
    let stream = {
        let mut state = app.borrow_mut();
        state.form.stop_camera();
        state.stream.take()
    };
    close_stream(stream, camera_video().as_ref());
    set_modal_hidden(true);
}

fn start_camera(app: &Shared, slot: PhotoSlot) {
    let Some(video) = camera_video() else {
        return;
    };
    let constraints = app.borrow_mut().form.start_camera(slot);
    let app = app.clone();
    spawn_local(async move {
        match open_stream(&video, &constraints).await {
            Ok(stream) => {
                let ready = {
                    let mut state = app.borrow_mut();
                    state.stream = Some(stream);
                    state.form.camera_ready()
                };
                if ready {
                    set_modal_hidden(false);
                } else {
                    // Stopped while the stream was opening
                    stop_camera(&app);
                }
            }
            Err(e) => {
                let notice = app.borrow_mut().form.camera_failed(&e.to_string());
                notify(&app, &notice);
            }
        }
    });
}

fn capture_photo(app: &Shared) {
    let frame = match camera_video().map(|video| grab_frame(&video)) {
        Some(Ok(frame)) => frame,
        Some(Err(e)) => {
            error!("Error capturing photo: {}", e);
            image::RgbaImage::new(0, 0)
        }
        None => image::RgbaImage::new(0, 0),
    };

    let (slot, notice) = {
        let mut state = app.borrow_mut();
        let slot = state.form.camera().active_slot();
        (slot, state.form.capture_photo(&frame))
    };

    if !notice.is_error() {
        stop_camera(app);
        if let Some(slot) = slot {
            show_slot_preview(app, slot);
        }
    }
    notify(app, &notice);
}

fn wire_camera(app: &Shared, document: &Document) -> Result<(), WebError> {
    {
        let app = app.clone();
        expose("startCamera", move |slot: JsValue| {
            match slot.as_string().as_deref().and_then(PhotoSlot::from_key) {
                Some(slot) => start_camera(&app, slot),
                None => error!("startCamera: unknown photo slot"),
            }
        })?;
    }

    {
        let app = app.clone();
        listen_by_id(document, "closeModal", "click", move |_| stop_camera(&app))?;
    }

    {
        let app = app.clone();
        listen_by_id(document, "captureBtn", "click", move |_| capture_photo(&app))?;
    }

    if let Some(modal) = document.get_element_by_id("cameraModal") {
        let app = app.clone();
        let backdrop = modal.clone();
        listen(&modal, "click", move |event| {
            let on_backdrop = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|target| target == backdrop);
            if on_backdrop {
                stop_camera(&app);
            }
        })?;
    }

    let app = app.clone();
    listen(document, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let closed = app.borrow_mut().form.handle_key(&event.key());
        if closed {
            stop_camera(&app);
        }
    })?;
    Ok(())
}

fn reset_page(app: &Shared, document: &Document) {
    let (notice, stream) = {
        let mut state = app.borrow_mut();
        let notice = state.form.reset();
        state.present_signature();
        (notice, state.stream.take())
    };
    close_stream(stream, camera_video().as_ref());
    set_modal_hidden(true);

    if let Some(form) = dom::find_element::<HtmlFormElement>(document, "cleaningForm") {
        form.reset();
    }
    for slot in PhotoSlot::ALL {
        if let Err(e) = dom::clear_preview(document, slot) {
            error!("Failed to clear preview: {}", e);
        }
    }
    if let Some(list) = document.get_element_by_id("personalList") {
        list.set_inner_html(PERSONNEL_FIRST_ROW);
    }

    notify(app, &notice);
}

fn wire_reset(app: &Shared, document: &Document) -> Result<(), WebError> {
    let app = app.clone();
    listen_by_id(document, "resetForm", "click", move |_| {
        let confirmed = dom::window()
            .and_then(|w| Ok(w.confirm_with_message(RESET_CONFIRMATION)?))
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        if let Ok(document) = dom::document() {
            reset_page(&app, &document);
        }
    })
}

fn wire_share(app: &Shared) -> Result<(), WebError> {
    {
        let app = app.clone();
        expose("shareWhatsApp", move |_| {
            let payload = app.borrow_mut().form.prepare_share();
            match payload {
                Ok(payload) => {
                    let app = app.clone();
                    spawn_local(async move {
                        let mut target = BrowserShare::new();
                        let notice = share_with_notice(&mut target, &payload).await;
                        notify(&app, &notice);
                    });
                }
                Err(e) => notify(&app, &Notice::from(&e)),
            }
        })?;
    }

    let app = app.clone();
    expose("exportPdf", move |_| {
        let report = app.borrow_mut().form.report();
        match report {
            Ok(report) => {
                let app = app.clone();
                spawn_local(async move {
                    let notice = export_with_notice(&mut PrintRenderer, &report).await;
                    notify(&app, &notice);
                });
            }
            Err(e) => notify(&app, &Notice::from(&e)),
        }
    })
}
