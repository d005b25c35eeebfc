use vulkano::device::QueueFlags;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Scans families in enumeration order and keeps the first graphics-capable one.
    pub fn find<I>(families: I) -> Self
    where
        I: IntoIterator<Item = QueueFlags>,
    {
        let mut indices = Self::default();

        for (i, flags) in families.into_iter().enumerate() {
            if flags.intersects(QueueFlags::GRAPHICS) {
                indices.graphics_family = Some(i as u32);
            }

            if indices.is_complete() {
                break;
            }
        }

        indices
    }

    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_families_is_incomplete() {
        let indices = QueueFamilyIndices::find(std::iter::empty());
        assert_eq!(indices.graphics_family, None);
        assert!(!indices.is_complete());
    }

    #[test]
    fn compute_and_transfer_only_is_incomplete() {
        let indices = QueueFamilyIndices::find([QueueFlags::COMPUTE, QueueFlags::TRANSFER]);
        assert!(!indices.is_complete());
    }

    #[test]
    fn first_graphics_family_wins() {
        let indices = QueueFamilyIndices::find([
            QueueFlags::TRANSFER,
            QueueFlags::GRAPHICS | QueueFlags::COMPUTE,
            QueueFlags::GRAPHICS,
        ]);
        assert_eq!(indices.graphics_family, Some(1));
        assert!(indices.is_complete());
    }
}
