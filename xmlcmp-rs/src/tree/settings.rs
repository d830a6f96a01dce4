//! Settings of an XML comparison.

use std::ops::{Deref, DerefMut};

use super::model::{DefaultXmlModel, Relevance, XmlComparisonModel};
use crate::compare::ComparisonSettings;

/// Tolerance rules and model of an XML comparison, plus the switches that
/// decide which parts of a document are relevant.
///
/// Dereferences to [`ComparisonSettings`] for tolerance rules and key
/// expressions. Relevance switches are stored on the model, which needs them
/// to extract children and compare nodes.
///
/// | Switch                   | Default |
/// |--------------------------|---------|
/// | encoding                 | off     |
/// | namespace                | off     |
/// | whitespace               | off     |
/// | comments                 | off     |
/// | CDATA                    | on      |
/// | processing instructions  | off     |
#[derive(Debug, Clone)]
pub struct XmlComparisonSettings<M = DefaultXmlModel> {
    base: ComparisonSettings<M>,
    encoding_relevant: bool,
}

impl Default for XmlComparisonSettings<DefaultXmlModel> {
    fn default() -> Self {
        Self::new(DefaultXmlModel::new())
    }
}

impl<M: XmlComparisonModel> XmlComparisonSettings<M> {
    pub fn new(model: M) -> Self {
        XmlComparisonSettings {
            base: ComparisonSettings::new(model),
            encoding_relevant: false,
        }
    }

    pub fn is_encoding_relevant(&self) -> bool {
        self.encoding_relevant
    }

    pub fn set_encoding_relevant(&mut self, relevant: bool) -> &mut Self {
        self.encoding_relevant = relevant;
        self
    }

    pub fn is_namespace_relevant(&self) -> bool {
        self.is_relevant(Relevance::NAMESPACE)
    }

    pub fn set_namespace_relevant(&mut self, relevant: bool) -> &mut Self {
        self.set_relevant(Relevance::NAMESPACE, relevant)
    }

    pub fn is_whitespace_relevant(&self) -> bool {
        self.is_relevant(Relevance::WHITESPACE)
    }

    pub fn set_whitespace_relevant(&mut self, relevant: bool) -> &mut Self {
        self.set_relevant(Relevance::WHITESPACE, relevant)
    }

    pub fn is_comment_relevant(&self) -> bool {
        self.is_relevant(Relevance::COMMENT)
    }

    pub fn set_comment_relevant(&mut self, relevant: bool) -> &mut Self {
        self.set_relevant(Relevance::COMMENT, relevant)
    }

    pub fn is_cdata_relevant(&self) -> bool {
        self.is_relevant(Relevance::CDATA)
    }

    pub fn set_cdata_relevant(&mut self, relevant: bool) -> &mut Self {
        self.set_relevant(Relevance::CDATA, relevant)
    }

    pub fn is_processing_instruction_relevant(&self) -> bool {
        self.is_relevant(Relevance::PROCESSING_INSTRUCTION)
    }

    pub fn set_processing_instruction_relevant(&mut self, relevant: bool) -> &mut Self {
        self.set_relevant(Relevance::PROCESSING_INSTRUCTION, relevant)
    }

    fn is_relevant(&self, flag: Relevance) -> bool {
        self.base.model().relevance().contains(flag)
    }

    fn set_relevant(&mut self, flag: Relevance, relevant: bool) -> &mut Self {
        self.base.model_mut().set_relevant(flag, relevant);
        self
    }
}

impl<M> Deref for XmlComparisonSettings<M> {
    type Target = ComparisonSettings<M>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<M> DerefMut for XmlComparisonSettings<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
