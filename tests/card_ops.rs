use std::{
    cell::{Cell, RefCell},
    path::PathBuf,
};

use cardwright::{
    CardConfig, CardResult, CardType, GearworkCard, MeasureRequest, Op, Renderer, TextDimensions,
};

#[derive(Clone, Debug, PartialEq)]
struct RecordedMeasure {
    font_file: PathBuf,
    point_size: f64,
    interline_spacing: i32,
    line_count: usize,
    text: String,
}

/// Renderer double that hands back fixed title dimensions and records
/// every measurement request.
struct FakeRenderer {
    title_dims: TextDimensions,
    measure_calls: Cell<usize>,
    last_measure: RefCell<Option<RecordedMeasure>>,
}

impl FakeRenderer {
    fn with_title_height(height: u32) -> Self {
        Self {
            title_dims: TextDimensions {
                width: 1000,
                height,
            },
            measure_calls: Cell::new(0),
            last_measure: RefCell::new(None),
        }
    }
}

impl Renderer for FakeRenderer {
    fn measure_text(&self, request: &MeasureRequest<'_>) -> CardResult<TextDimensions> {
        self.measure_calls.set(self.measure_calls.get() + 1);
        *self.last_measure.borrow_mut() = Some(RecordedMeasure {
            font_file: request.font_file.to_path_buf(),
            point_size: request.point_size,
            interline_spacing: request.interline_spacing,
            line_count: request.line_count,
            text: request.text.to_string(),
        });
        Ok(self.title_dims)
    }

    fn run_pipeline(&self, _ops: &[Op]) -> CardResult<()> {
        Ok(())
    }
}

fn base_config() -> CardConfig {
    CardConfig {
        source_file: PathBuf::from("no/such/s01e01.jpg"),
        output_file: PathBuf::from("target/card_ops/s01e01.jpg"),
        title_text: "HELLO".to_string(),
        season_text: "SEASON 1".to_string(),
        episode_text: "EPISODE 1".to_string(),
        hide_season_text: false,
        hide_episode_text: false,
        font_file: None,
        font_color: None,
        font_size: 1.0,
        font_interline_spacing: 0,
        font_vertical_shift: 0,
        episode_text_color: None,
        blur: false,
        grayscale: false,
    }
}

fn annotation(op: &Op) -> Option<&cardwright::TextOp> {
    match op {
        Op::AnnotateText(text_op) => Some(text_op),
        _ => None,
    }
}

fn index_annotations(ops: &[Op]) -> Vec<&cardwright::TextOp> {
    ops.iter()
        .filter_map(annotation)
        .filter(|t| t.point_size == 60.0)
        .collect()
}

fn title_annotations(ops: &[Op]) -> Vec<&cardwright::TextOp> {
    ops.iter()
        .filter_map(annotation)
        .filter(|t| t.point_size != 60.0)
        .collect()
}

#[test]
fn full_pipeline_matches_expected_order() {
    let card = GearworkCard::new(base_config()).unwrap();
    let renderer = FakeRenderer::with_title_height(100);
    let ops = card.build_operations(&renderer).unwrap();

    assert!(matches!(ops[0], Op::LoadImage(_)));
    assert!(matches!(ops[1], Op::ResizeFill { .. }));
    assert!(matches!(ops[2], Op::Extent { .. }));
    assert!(matches!(ops[3], Op::CompositeImage(_)));

    let index = index_annotations(&ops);
    let title = title_annotations(&ops);
    assert_eq!(index.len(), 3);
    assert_eq!(title.len(), 3);

    // Index layers composite before title layers, title layers before the
    // output resize and the final write.
    let index_pos: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| annotation(op).is_some_and(|t| t.point_size == 60.0))
        .map(|(i, _)| i)
        .collect();
    let title_pos: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| annotation(op).is_some_and(|t| t.point_size != 60.0))
        .map(|(i, _)| i)
        .collect();
    let resize_pos = ops
        .iter()
        .position(|op| matches!(op, Op::ResizeOutput { .. }))
        .unwrap();
    assert!(index_pos.iter().max() < title_pos.iter().min());
    assert!(*title_pos.iter().max().unwrap() < resize_pos);
    assert!(matches!(ops.last(), Some(Op::WriteImage(_))));

    // Scenario values: default size and shift.
    assert_eq!(title[0].point_size, 256.0);
    assert_eq!(title[0].y_offset, 47);
    assert_eq!(index[0].text, "SEASON 1 \u{2022} EPISODE 1");
    assert_eq!(index[0].y_offset, 47 + 100 - 10);
    assert_eq!(ops.len(), 12);
}

#[test]
fn mask_sits_between_title_layers_and_output_resize() {
    let dir = PathBuf::from("target").join("card_ops_mask");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("ep1-mask.png"), b"png").unwrap();

    let mut config = base_config();
    config.source_file = dir.join("ep1.jpg");
    let card = GearworkCard::new(config).unwrap();
    let ops = card
        .build_operations(&FakeRenderer::with_title_height(80))
        .unwrap();

    let mask_pos = ops
        .iter()
        .position(|op| matches!(op, Op::ApplyMask(_)))
        .expect("mask op present");
    let last_title_pos = ops
        .iter()
        .rposition(|op| annotation(op).is_some())
        .unwrap();
    let resize_pos = ops
        .iter()
        .position(|op| matches!(op, Op::ResizeOutput { .. }))
        .unwrap();
    assert!(last_title_pos < mask_pos);
    assert!(mask_pos < resize_pos);
}

#[test]
fn title_measurement_is_memoized_per_card() {
    let card = GearworkCard::new(base_config()).unwrap();
    let renderer = FakeRenderer::with_title_height(100);

    let first = card.measure_title(&renderer).unwrap();
    let second = card.measure_title(&renderer).unwrap();
    card.build_operations(&renderer).unwrap();
    card.build_operations(&renderer).unwrap();

    assert_eq!(first, second);
    assert_eq!(renderer.measure_calls.get(), 1);
}

#[test]
fn hidden_index_text_still_measures_title() {
    let mut config = base_config();
    config.hide_season_text = true;
    config.hide_episode_text = true;
    let card = GearworkCard::new(config).unwrap();
    let renderer = FakeRenderer::with_title_height(100);

    let ops = card.build_operations(&renderer).unwrap();
    assert!(index_annotations(&ops).is_empty());
    assert_eq!(title_annotations(&ops).len(), 3);
    assert_eq!(renderer.measure_calls.get(), 1);
}

#[test]
fn hidden_season_keeps_episode_text_only() {
    let mut config = base_config();
    config.hide_season_text = true;
    let card = GearworkCard::new(config).unwrap();
    let ops = card
        .build_operations(&FakeRenderer::with_title_height(100))
        .unwrap();

    for op in index_annotations(&ops) {
        assert_eq!(op.text, "EPISODE 1");
    }
}

#[test]
fn escaped_title_is_identical_across_layers() {
    let mut config = base_config();
    config.title_text = "SAY \"HI\"".to_string();
    let card = GearworkCard::new(config).unwrap();
    let ops = card
        .build_operations(&FakeRenderer::with_title_height(100))
        .unwrap();

    let title = title_annotations(&ops);
    assert_eq!(title.len(), 3);
    for op in &title {
        assert_eq!(op.text, "SAY \\\"HI\\\"");
    }
}

#[test]
fn measurement_carries_resolved_font_settings() {
    let mut config = base_config();
    config.title_text = "TOP\nBOTTOM".to_string();
    config.font_size = 1.5;
    config.font_interline_spacing = 10;
    let card = GearworkCard::new(config).unwrap();
    let renderer = FakeRenderer::with_title_height(200);
    card.build_operations(&renderer).unwrap();

    let recorded = renderer.last_measure.borrow().clone().unwrap();
    assert!(recorded.font_file.ends_with("Gearwork-Main.otf"));
    assert_eq!(recorded.point_size, 384.0);
    assert_eq!(recorded.interline_spacing, -40);
    assert_eq!(recorded.line_count, 2);
    assert_eq!(recorded.text, "TOP\nBOTTOM");
}

#[test]
fn vertical_shift_moves_title_and_index_together() {
    let mut config = base_config();
    config.font_vertical_shift = 5;
    let card = GearworkCard::new(config).unwrap();
    let ops = card
        .build_operations(&FakeRenderer::with_title_height(100))
        .unwrap();

    assert_eq!(title_annotations(&ops)[0].y_offset, 52);
    assert_eq!(index_annotations(&ops)[0].y_offset, 52 + 100 - 10);
}
