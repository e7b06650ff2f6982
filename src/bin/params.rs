use backdrop::params::VisionParams;
use serde_json::json;

fn main() {
    let params = VisionParams::default();
    let json = json!({
        "default": params,
        "ranges": {
            "feature_count": VisionParams::FEATURE_COUNT,
            "pyramid_scale_factor": VisionParams::PYRAMID_SCALE_FACTOR,
            "patch_size": VisionParams::PATCH_SIZE,
            "matcher_search_budget": VisionParams::MATCHER_SEARCH_BUDGET,
            "pose_success_probability": VisionParams::POSE_SUCCESS_PROBABILITY,
            "pose_inlier_threshold": VisionParams::POSE_INLIER_THRESHOLD,
        },
    });
    println!("{}", serde_json::to_string_pretty(&json).unwrap());
}
