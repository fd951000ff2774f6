use crate::core::geo::LatLng;

/// How a marker is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// The mapping library's stock pin
    Default,
    /// A bitmap icon
    Image {
        url: String,
        size: (u32, u32),
        anchor: (u32, u32),
    },
    /// Arbitrary HTML inside a sized box carrying `class_name`
    Div {
        class_name: String,
        html: String,
        size: (u32, u32),
        anchor: (u32, u32),
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    position: LatLng,
    icon: Icon,
    z_index_offset: i32,
    alt: Option<String>,
    classes: Vec<String>,
}

impl Marker {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            icon: Icon::Default,
            z_index_offset: 0,
            alt: None,
            classes: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_z_index_offset(mut self, offset: i32) -> Self {
        self.z_index_offset = offset;
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Adds a class to the rendered marker element
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn z_index_offset(&self) -> i32 {
        self.z_index_offset
    }

    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    /// Every class on the rendered element, the div icon's class included
    pub fn classes(&self) -> Vec<String> {
        let mut classes = Vec::with_capacity(self.classes.len() + 1);
        if let Icon::Div { class_name, .. } = &self.icon {
            classes.extend(class_name.split_whitespace().map(str::to_string));
        }
        classes.extend(self.classes.iter().cloned());
        classes
    }

    pub fn image_src(&self) -> Option<&str> {
        match &self.icon {
            Icon::Image { url, .. } => Some(url),
            _ => None,
        }
    }
}
