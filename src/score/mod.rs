use serde_json::Value;

/// Detection labels that count toward an address's recyclable score.
const RECYCLABLES: [&str; 3] = ["glass", "plastic", "metal"];

/// A detection must strictly exceed this confidence to count.
const SCORE_THRESHOLD: f64 = 0.5;

/// Counts qualifying recyclable detections in a raw prediction response list.
///
/// Walks every result object and every item in its `payload`; an item counts
/// when its `displayName` is a recyclable label and its
/// `imageObjectDetection.score` exceeds the threshold. Null, absent, or
/// malformed nodes contribute zero.
pub fn count_recyclables(results: &Value) -> i64 {
    let mut count = 0;

    if let Some(results) = results.as_array() {
        for result in results {
            let Some(items) = result.get("payload").and_then(Value::as_array) else {
                continue;
            };

            for item in items {
                let label = item.get("displayName").and_then(Value::as_str).unwrap_or("");
                let confidence = item
                    .get("imageObjectDetection")
                    .and_then(|d| d.get("score"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);

                if RECYCLABLES.contains(&label) && confidence > SCORE_THRESHOLD {
                    count += 1;
                }
            }
        }
    }

    count
}
