//! Provide Object Detection
//!
pub mod onnx {
    use image::{imageops::FilterType, ImageBuffer, Pixel, Rgb};
    use ndarray::{s, Array, Axis, IxDyn};
    use ort::{
        environment::Environment, value::Value, ExecutionProvider, GraphOptimizationLevel,
        LoggingLevel, Session, SessionBuilder,
    };
    use std::path::Path;

    use crate::module::util::conf;

    use super::{select_tier, Detection, Tier, TierOutcome, TierReport};

    /// Word and letter detection sessions plus their class name tables.
    ///
    pub struct SignDetector {
        words: Session,
        letters: Session,
        words_names: Vec<String>,
        letters_names: Vec<String>,
        imgsz: u32,
    }

    /// Methods for the sign detector.
    ///
    impl SignDetector {
        /// SignDetector's constructor.
        ///
        pub fn new(conf: &conf::Vision) -> Result<Self, Box<dyn std::error::Error>> {
            Ok(Self {
                words: Self::get_session("signbridge_words", &conf.words_model)?,
                letters: Self::get_session("signbridge_letters", &conf.letters_model)?,
                words_names: load_labels(&conf.words_labels),
                letters_names: load_labels(&conf.letters_labels),
                imgsz: conf.imgsz,
            })
        }

        /// get session
        ///
        pub fn get_session(
            name: &str,
            model_path: &str,
        ) -> Result<Session, Box<dyn std::error::Error>> {
            let environment = Environment::builder()
                .with_name(name)
                .with_log_level(LoggingLevel::Warning)
                .with_execution_providers([ExecutionProvider::CPU(Default::default())])
                .build()?
                .into_arc();
            let session = SessionBuilder::new(&environment)?
                .with_optimization_level(GraphOptimizationLevel::Level1)?
                .with_intra_threads(8)?
                .with_model_from_file(model_path)?;
            Ok(session)
        }

        /// Run a single model on the image at `impath`.
        ///
        pub fn infer(
            &self,
            impath: &str,
            tier: Tier,
            threshold: f32,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            let sz = self.imgsz;
            // Load image and resize to model's shape, converting to RGB format
            let img: ImageBuffer<Rgb<u8>, Vec<u8>> = image::open(Path::new(impath))?
                .resize_exact(sz, sz, FilterType::Nearest)
                .to_rgb8();

            let array = ndarray::CowArray::from(
                ndarray::Array::from_shape_fn((1, 3, sz as usize, sz as usize), |(_, c, j, i)| {
                    let pixel = img.get_pixel(i as u32, j as u32);
                    let channels = pixel.channels();
                    // normalize
                    // range [0, 255] -> range [0, 1]
                    (channels[c] as f32) / 255.0
                })
                .into_dyn(),
            );

            let (session, names) = match tier {
                Tier::Words => (&self.words, &self.words_names),
                Tier::Letters => (&self.letters, &self.letters_names),
            };

            let tensor = vec![Value::from_array(session.allocator(), &array)?];

            let outs = session.run(tensor)?;
            let out = outs
                .get(0)
                .ok_or("model produced no output tensor")?
                .try_extract::<f32>()?
                .view()
                .t()
                .into_owned();
            convert_yolo_fmt(out, threshold, names)
        }

        /// Two-tier detection: words first, letters only when the word
        /// model yields nothing (or fails). A non-empty word result always
        /// wins, regardless of what the letter model would score.
        pub fn detect(
            &self,
            impath: &str,
            thresholds: &conf::DetectThreshold,
        ) -> TierReport {
            let words = self.outcome(impath, Tier::Words, thresholds.words);
            let letters = match words {
                // Word tier won; the letter model is not run.
                TierOutcome::Found(_) => TierOutcome::Empty,
                _ => self.outcome(impath, Tier::Letters, thresholds.letters),
            };
            select_tier(words, letters)
        }

        fn outcome(&self, impath: &str, tier: Tier, threshold: f32) -> TierOutcome {
            match self.infer(impath, tier, threshold) {
                Ok(dets) if dets.is_empty() => TierOutcome::Empty,
                Ok(dets) => TierOutcome::Found(dets),
                Err(e) => {
                    log::warn!("{} inference failed: {}", tier.as_str(), e);
                    TierOutcome::Failed(e.to_string())
                }
            }
        }
    }

    /// Read class names from a sidecar label file, one per line.
    /// A missing file degrades to numeric class names.
    fn load_labels(path: &str) -> Vec<String> {
        match std::fs::read_to_string(path) {
            Ok(body) => body
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            Err(e) => {
                log::warn!("Can't read label file {}: {}", path, e);
                vec![]
            }
        }
    }

    /// Decode YOLO-style output rows: [x, y, w, h, score_0, .., score_n].
    fn convert_yolo_fmt(
        out: Array<f32, IxDyn>,
        threshold: f32,
        names: &[String],
    ) -> Result<Vec<super::Detection>, Box<dyn std::error::Error>> {
        let mut bboxes = vec![];
        let output = out.slice(s![.., .., 0]);
        for row in output.axis_iter(Axis(0)) {
            let row: Vec<_> = row.iter().copied().collect();
            let (class_id, prob) = row
                .iter()
                .skip(4)
                .enumerate()
                .map(|(index, value)| (index, *value))
                .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
                .ok_or("output row has no class scores")?;
            if prob < threshold {
                continue;
            }
            let cls = class_id as u32;
            let name = names
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| cls.to_string());
            let xc = row[0];
            let yc = row[1];
            let w = row[2] as u32;
            let h = row[3] as u32;
            let x1 = (xc - w as f32 / 2.0) as u32;
            let x2 = (xc + w as f32 / 2.0) as u32;
            let y1 = (yc - h as f32 / 2.0) as u32;
            let y2 = (yc + h as f32 / 2.0) as u32;
            bboxes.push(super::Detection {
                x1,
                y1,
                x2,
                y2,
                xc,
                yc,
                cls,
                name,
                prob,
                w,
                h,
            })
        }
        bboxes.sort_by(|box1, box2| box2.prob.total_cmp(&box1.prob));
        Ok(merge_bboxes(bboxes))
    }

    /// Function to compute the IoU of two rectangles.
    ///
    fn iou(r1: &Detection, r2: &Detection) -> f64 {
        let x1 = r1.x1.max(r2.x1) as f64;
        let y1 = r1.y1.max(r2.y1) as f64;
        let x2 = r1.x2.min(r2.x2) as f64;
        let y2 = r1.y2.min(r2.y2) as f64;
        let w = if x2 - x1 > 0.0 { x2 - x1 } else { 0.0 };
        let h = if y2 - y1 > 0.0 { y2 - y1 } else { 0.0 };
        let intersection = w * h;
        let area_r1 = ((r1.x2 - r1.x1 + 1) * (r1.y2 - r1.y1 + 1)) as f64;
        let area_r2 = ((r2.x2 - r2.x1 + 1) * (r2.y2 - r2.y1 + 1)) as f64;
        let union = area_r1 + area_r2 - intersection;
        intersection / union
    }

    /// Merges bounding boxes of the same class whose IoU is greater than
    /// or equal to 0.7.
    fn merge_bboxes(bboxes: Vec<Detection>) -> Vec<Detection> {
        let mut merged_bboxes = Vec::new();
        let mut used = vec![false; bboxes.len()];
        for i in 0..bboxes.len() {
            if used[i] {
                continue;
            }
            let mut merged_bbox = bboxes[i].clone();
            used[i] = true;
            for j in 0..bboxes.len() {
                if used[j] || bboxes[i].cls != bboxes[j].cls {
                    continue;
                }
                if iou(&bboxes[i], &bboxes[j]) >= 0.7 {
                    let x1 = merged_bbox.x1.min(bboxes[j].x1);
                    let y1 = merged_bbox.y1.min(bboxes[j].y1);
                    let x2 = merged_bbox.x2.max(bboxes[j].x2);
                    let y2 = merged_bbox.y2.max(bboxes[j].y2);
                    let w = x2 - x1;
                    let h = y2 - y1;
                    let xc = x1 as f32 + w as f32 / 2.0;
                    let yc = y1 as f32 + h as f32 / 2.0;

                    merged_bbox = Detection {
                        x1,
                        y1,
                        x2,
                        y2,
                        xc,
                        yc,
                        cls: merged_bbox.cls,
                        name: merged_bbox.name.clone(),
                        prob: merged_bbox.prob,
                        w,
                        h,
                    };
                    used[j] = true;
                }
            }
            merged_bboxes.push(merged_bbox);
        }
        merged_bboxes
    }

}

/// Which model produced a detection report.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Words,
    Letters,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Words => "words",
            Tier::Letters => "letters",
        }
    }
}

/// Typed outcome of a single model run. `Empty` (the model ran and found
/// nothing) and `Failed` (inference itself broke) are distinct on purpose;
/// both fall through to the next tier but only one is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    Found(Vec<Detection>),
    Empty,
    Failed(String),
}

/// Combined report of a two-tier detection pass.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TierReport {
    pub tier: Tier,
    pub detections: Vec<Detection>,
    pub word_error: Option<String>,
    pub letter_error: Option<String>,
}

/// Pick the reporting tier from the two model outcomes. The word tier wins
/// whenever it found anything; otherwise the letter result is reported,
/// even when empty.
pub fn select_tier(words: TierOutcome, letters: TierOutcome) -> TierReport {
    match words {
        TierOutcome::Found(detections) => TierReport {
            tier: Tier::Words,
            detections,
            word_error: None,
            letter_error: None,
        },
        words => {
            let word_error = match words {
                TierOutcome::Failed(e) => Some(e),
                _ => None,
            };
            let (detections, letter_error) = match letters {
                TierOutcome::Found(dets) => (dets, None),
                TierOutcome::Empty => (vec![], None),
                TierOutcome::Failed(e) => (vec![], Some(e)),
            };
            TierReport {
                tier: Tier::Letters,
                detections,
                word_error,
                letter_error,
            }
        }
    }
}

/// Detection result
///
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub xc: f32,
    pub yc: f32,
    pub cls: u32,
    pub name: String,
    pub prob: f32,
    pub w: u32,
    pub h: u32,
}

impl Detection {
    /// One-line text summary for reports and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) conf {:.3} box [{}, {}, {}, {}]",
            self.name, self.cls, self.prob, self.x1, self.y1, self.x2, self.y2
        )
    }
}
