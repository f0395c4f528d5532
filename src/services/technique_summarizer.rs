/// Technique Summarizer
///
/// Turns per-frame pose data into a short, discipline specific text block for
/// the hosted coaching model.
///
/// Rule based and deterministic. Each discipline owns a vocabulary table of
/// qualitative bands (applied to the session means) and cues (applied to a
/// single frame). New disciplines are added by data, not control flow.
use statrs::statistics::Statistics;

use crate::models::discipline::Discipline;
use crate::models::joint_angles::JointAngles;
use crate::models::pose_data::PoseDataPoint;

/// Returned when there is nothing to summarize
pub const NO_POSE_DATA_SUMMARY: &str =
    "No pose data available: no body was detected in the analyzed frames.";

/// Angle spread (std dev, degrees) above which a metric is called inconsistent
const INCONSISTENT_SPREAD: f64 = 20.0;

/// A bilateral joint measure used by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Knee,
    Hip,
    Elbow,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Knee, Metric::Hip, Metric::Elbow];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Knee => "knee",
            Metric::Hip => "hip",
            Metric::Elbow => "elbow",
        }
    }

    /// Left/right average, ignoring unavailable sides
    pub fn measure(&self, angles: &JointAngles) -> Option<f32> {
        match self {
            Metric::Knee => angles.knee(),
            Metric::Hip => angles.hip(),
            Metric::Elbow => angles.elbow(),
        }
    }
}

/// Angle range in degrees. `Below` and `Above` are exclusive, `Between` is
/// inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleRange {
    Below(f32),
    Between(f32, f32),
    Above(f32),
}

impl AngleRange {
    pub fn contains(&self, degrees: f32) -> bool {
        match *self {
            AngleRange::Below(max) => degrees < max,
            AngleRange::Between(min, max) => (min..=max).contains(&degrees),
            AngleRange::Above(min) => degrees > min,
        }
    }
}

/// One row of a vocabulary table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub metric: Metric,
    pub range: AngleRange,
    pub message: &'static str,
}

const fn band(metric: Metric, range: AngleRange, message: &'static str) -> Band {
    Band {
        metric,
        range,
        message,
    }
}

/// Discipline vocabulary: session-level bands and single-frame cues, both
/// evaluated in table order
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub bands: &'static [Band],
    pub cues: &'static [Band],
}

use AngleRange::{Above, Below, Between};
use Metric::{Elbow, Hip, Knee};

static FOOTBALL: Vocabulary = Vocabulary {
    bands: &[
        band(Knee, Below(100.0), "plant leg too bent - losing stability and power"),
        band(Knee, Between(100.0, 150.0), "good knee flexion on the plant leg"),
        band(Knee, Above(150.0), "plant leg too straight - bend the knee to absorb and balance"),
        band(Hip, Below(60.0), "limited hip rotation - open the hips through the strike"),
        band(Hip, Between(60.0, 90.0), "strong hip rotation - generating good power"),
        band(Hip, Above(90.0), "hips upright - lean over the ball at contact"),
        band(Elbow, Below(90.0), "arms tucked in - use them wider for balance"),
        band(Elbow, Above(90.0), "arms out wide for balance"),
    ],
    cues: &[
        band(Knee, Below(100.0), "plant leg too bent"),
        band(Knee, Above(150.0), "plant leg too straight"),
        band(Hip, Between(60.0, 90.0), "good hip rotation"),
    ],
};

static BASKETBALL: Vocabulary = Vocabulary {
    bands: &[
        band(Knee, Below(90.0), "deep knee bend - strong load for the jump"),
        band(Knee, Between(90.0, 140.0), "balanced knee bend for the shooting base"),
        band(Knee, Above(140.0), "legs too straight - bend the knees to generate lift"),
        band(Elbow, Below(80.0), "shooting elbow too tight - ball set too close"),
        band(Elbow, Between(80.0, 110.0), "elbow near 90 degrees - solid shooting pocket"),
        band(Elbow, Above(110.0), "arm extending - follow through high over the rim"),
        band(Hip, Below(120.0), "hips sitting back - stay square to the basket"),
        band(Hip, Above(150.0), "tall hip line - good vertical alignment"),
    ],
    cues: &[
        band(Knee, Above(160.0), "legs locked"),
        band(Elbow, Between(80.0, 110.0), "set position"),
        band(Elbow, Above(160.0), "full release"),
    ],
};

static BOXING: Vocabulary = Vocabulary {
    bands: &[
        band(Elbow, Below(70.0), "tight guard - hands protecting the chin"),
        band(Elbow, Between(70.0, 150.0), "punches partially extended - commit to full range"),
        band(Elbow, Above(150.0), "full extension - snap the punch back to guard"),
        band(Knee, Below(150.0), "knees bent - athletic stance"),
        band(Knee, Above(165.0), "stance too upright - sit down on the punches"),
        band(Hip, Below(150.0), "hips engaged - rotating into the punch"),
    ],
    cues: &[
        band(Elbow, Above(160.0), "arm fully extended"),
        band(Elbow, Below(70.0), "guard up"),
        band(Knee, Above(170.0), "legs straight"),
    ],
};

static MMA: Vocabulary = Vocabulary {
    bands: &[
        band(Knee, Below(110.0), "low level - ready to shoot or sprawl"),
        band(Knee, Between(110.0, 155.0), "balanced fighting stance"),
        band(Knee, Above(155.0), "stance too tall - vulnerable to takedowns"),
        band(Hip, Below(120.0), "hips loaded - good base"),
        band(Hip, Above(160.0), "hips square and high - lower the center of gravity"),
        band(Elbow, Below(80.0), "elbows tight - protecting the body"),
        band(Elbow, Above(150.0), "arms extended - recover the guard"),
    ],
    cues: &[
        band(Knee, Below(110.0), "level change"),
        band(Knee, Above(165.0), "upright"),
        band(Elbow, Above(160.0), "strike extension"),
    ],
};

static TAEKWONDO: Vocabulary = Vocabulary {
    bands: &[
        band(Hip, Below(90.0), "high chamber - hip well flexed for the kick"),
        band(Hip, Between(90.0, 140.0), "moderate hip flexion - lift the knee higher"),
        band(Hip, Above(140.0), "limited kicking height - open the hip"),
        band(Knee, Below(90.0), "knee fully chambered"),
        band(Knee, Above(160.0), "kicking leg extended - snap back after impact"),
        band(Elbow, Below(100.0), "guard held close"),
    ],
    cues: &[
        band(Knee, Above(165.0), "kick extension"),
        band(Knee, Below(90.0), "chamber"),
        band(Hip, Below(90.0), "high kick"),
    ],
};

static AMERICAN_FOOTBALL: Vocabulary = Vocabulary {
    bands: &[
        band(Knee, Below(100.0), "low stance - good leverage off the line"),
        band(Knee, Between(100.0, 140.0), "athletic stance - stay low through contact"),
        band(Knee, Above(140.0), "playing too high - lower the pad level"),
        band(Hip, Below(90.0), "hips loaded - explosive drive position"),
        band(Hip, Above(130.0), "hips too high - sink the hips to drive"),
        band(Elbow, Below(90.0), "hands inside and tight"),
    ],
    cues: &[
        band(Knee, Above(150.0), "high pad level"),
        band(Hip, Below(90.0), "good drive angle"),
    ],
};

static GENERIC: Vocabulary = Vocabulary {
    bands: &[
        band(Knee, Below(90.0), "deep knee flexion"),
        band(Knee, Between(90.0, 160.0), "moderate knee flexion"),
        band(Knee, Above(160.0), "legs nearly straight"),
        band(Hip, Below(90.0), "deep hip flexion"),
        band(Hip, Between(90.0, 160.0), "moderate hip flexion"),
        band(Hip, Above(160.0), "upright torso"),
        band(Elbow, Below(90.0), "arms strongly bent"),
        band(Elbow, Above(160.0), "arms extended"),
    ],
    cues: &[
        band(Knee, Below(90.0), "deep knee bend"),
        band(Knee, Above(170.0), "legs locked"),
    ],
};

/// Vocabulary table for a discipline
pub fn vocabulary(discipline: Discipline) -> &'static Vocabulary {
    match discipline {
        Discipline::Football => &FOOTBALL,
        Discipline::Basketball => &BASKETBALL,
        Discipline::Boxing => &BOXING,
        Discipline::Mma => &MMA,
        Discipline::Taekwondo => &TAEKWONDO,
        Discipline::AmericanFootball => &AMERICAN_FOOTBALL,
        Discipline::Generic => &GENERIC,
    }
}

/// Mean and spread of one metric over the frames where it was available
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub metric: Metric,
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

/// Statistics for `metric`, or `None` when no frame has it
pub fn metric_stats(points: &[PoseDataPoint], metric: Metric) -> Option<MetricStats> {
    let values: Vec<f64> = points
        .iter()
        .filter_map(|p| metric.measure(&p.angles))
        .map(f64::from)
        .collect();
    if values.is_empty() {
        return None;
    }

    let std_dev = if values.len() > 1 {
        values.iter().std_dev()
    } else {
        0.0
    };
    Some(MetricStats {
        metric,
        mean: values.iter().mean(),
        std_dev,
        samples: values.len(),
    })
}

/// Build the technique summary for `points` (ordered by frame number)
pub fn summarize(points: &[PoseDataPoint], discipline: Discipline) -> String {
    if points.is_empty() {
        return NO_POSE_DATA_SUMMARY.to_string();
    }

    let vocabulary = vocabulary(discipline);
    let stats: Vec<MetricStats> = Metric::ALL
        .iter()
        .filter_map(|&metric| metric_stats(points, metric))
        .collect();
    let confidence = points.iter().map(|p| f64::from(p.confidence)).mean();

    let mut lines = vec![
        format!("{} technique summary", discipline.display_name()),
        format!(
            "Frames analyzed: {} (average confidence {:.0}%)",
            points.len(),
            confidence * 100.0
        ),
    ];

    if stats.is_empty() {
        lines.push("Average angles: unavailable (key joints not visible)".to_string());
    } else {
        let averages: Vec<String> = stats
            .iter()
            .map(|s| format!("{} {:.1}°", s.metric.name(), s.mean))
            .collect();
        lines.push(format!("Average angles: {}", averages.join(", ")));
    }

    lines.push("Assessment:".to_string());
    let assessment_start = lines.len();
    for s in &stats {
        if let Some(band) = first_match(vocabulary.bands, s.metric, s.mean as f32) {
            lines.push(format!(
                "- {} {:.0}°: {}",
                capitalize(s.metric.name()),
                s.mean,
                band.message
            ));
        }
        if s.samples > 1 && s.std_dev > INCONSISTENT_SPREAD {
            lines.push(format!(
                "- {} angle varies by ±{:.0}° across frames - inconsistent technique",
                capitalize(s.metric.name()),
                s.std_dev
            ));
        }
    }
    if lines.len() == assessment_start {
        lines.push("- No clear technique markers in the visible joints".to_string());
    }

    lines.push("Frame-by-frame:".to_string());
    for point in points {
        lines.push(format!(
            "- Frame {} ({:.2}s): {} - {}",
            point.frame_number,
            point.timestamp,
            describe_angles(&point.angles),
            frame_cue(vocabulary, &point.angles).unwrap_or("no notable issues")
        ));
    }

    lines.join("\n")
}

/// First cue in table order that matches the frame
pub fn frame_cue(vocabulary: &Vocabulary, angles: &JointAngles) -> Option<&'static str> {
    vocabulary
        .cues
        .iter()
        .find(|cue| {
            cue.metric
                .measure(angles)
                .is_some_and(|degrees| cue.range.contains(degrees))
        })
        .map(|cue| cue.message)
}

fn first_match(bands: &'static [Band], metric: Metric, degrees: f32) -> Option<&'static Band> {
    bands
        .iter()
        .find(|b| b.metric == metric && b.range.contains(degrees))
}

fn describe_angles(angles: &JointAngles) -> String {
    Metric::ALL
        .iter()
        .map(|metric| match metric.measure(angles) {
            Some(degrees) => format!("{} {:.0}°", metric.name(), degrees),
            None => format!("{} n/a", metric.name()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
