#![allow(dead_code)]

use anyhow::{anyhow, Result};
use doc_sorter::{
    config::Config,
    extract::PageRenderer,
    service::{ChatRequest, ChatService, MessageContent},
};
use image::{DynamicImage, Rgba, RgbaImage};
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Replays canned replies in order and records every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedService {
    replies: Rc<RefCell<VecDeque<Result<String, String>>>>,
    requests: Rc<RefCell<Vec<ChatRequest>>>,
}

impl ScriptedService {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            replies: Rc::new(RefCell::new(replies)),
            requests: Rc::default(),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.borrow().clone()
    }
}

impl ChatService for ScriptedService {
    fn complete(&self, req: &ChatRequest) -> Result<String> {
        self.requests.borrow_mut().push(req.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

/// Text of the system message of a classification request.
pub fn system_text(req: &ChatRequest) -> String {
    match &req.messages[0].content {
        MessageContent::Text(t) => t.clone(),
        MessageContent::Parts(_) => String::new(),
    }
}

/// Produces solid white pages of the given sizes.
pub struct FakeRenderer {
    pub pages: Vec<(u32, u32)>,
}

impl PageRenderer for FakeRenderer {
    fn render_pages(&self, _input: &Path, _scale: f32) -> Result<Vec<DynamicImage>> {
        Ok(self
            .pages
            .iter()
            .map(|&(w, h)| {
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
            })
            .collect())
    }
}

pub struct FailingRenderer;

impl PageRenderer for FailingRenderer {
    fn render_pages(&self, input: &Path, _scale: f32) -> Result<Vec<DynamicImage>> {
        Err(anyhow!("cannot open {}", input.display()))
    }
}

/// Stands in for a rendering library that panics on a malformed file.
pub struct PanickingRenderer;

impl PageRenderer for PanickingRenderer {
    fn render_pages(&self, _input: &Path, _scale: f32) -> Result<Vec<DynamicImage>> {
        let pages: Vec<DynamicImage> = Vec::new();
        Ok(vec![pages[0].clone()])
    }
}

pub fn test_config(output_dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.paths.output_dir = output_dir.display().to_string();
    cfg.classifier.prompt_template = "Classify this document:\n{PDF_TEXT}".into();
    cfg
}

/// One-page PDF with each line drawn in Helvetica; no lines means a page with
/// no text layer at all, like a scan.
pub fn write_pdf(path: &Path, lines: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    if !lines.is_empty() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![50.into(), 700.into()]));
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("write test pdf");
    path.to_path_buf()
}
