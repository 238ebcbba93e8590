//! Leaf disease class catalogue
//!
//! Labels are listed in the output order of the image classifier. The order
//! must match the order used when the model was trained.

/// Number of classes produced by the leaf disease classifier
pub const CLASS_COUNT: usize = 15;

/// Class labels indexed by classifier output position
pub const CLASS_NAMES: [&str; CLASS_COUNT] = [
    "Pepper__bell___Bacterial_spot",
    "Pepper__bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Tomato_Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites_Two_spotted_spider_mite",
    "Tomato__Target_Spot",
    "Tomato__Tomato_YellowLeaf__Curl_Virus",
    "Tomato__Tomato_mosaic_virus",
    "Tomato_healthy",
];

/// Label for a classifier output index
pub fn class_label(index: usize) -> Option<&'static str> {
    CLASS_NAMES.get(index).copied()
}

/// True for the "healthy" classes of any crop
pub fn is_healthy_label(label: &str) -> bool {
    label.ends_with("healthy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_label_lookup() {
        assert_eq!(class_label(0), Some("Pepper__bell___Bacterial_spot"));
        assert_eq!(class_label(14), Some("Tomato_healthy"));
        assert_eq!(class_label(CLASS_COUNT), None);
    }

    #[test]
    fn test_healthy_labels() {
        let healthy: Vec<_> = CLASS_NAMES.iter().filter(|l| is_healthy_label(l)).collect();
        assert_eq!(
            healthy,
            vec![&"Pepper__bell___healthy", &"Potato___healthy", &"Tomato_healthy"]
        );
    }
}
