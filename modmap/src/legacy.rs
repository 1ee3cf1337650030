//! The historical names of the lookups. Every alias logs a warning and forwards to its new name.

use crate::{AccessionId, Composition, MapperIssue, Registry, Specificity, UserModification};

impl Registry {
    /// Use [`Self::name_to_masses`]
    #[deprecated(note = "use `name_to_masses`")]
    pub fn name2mass_list(&self, name: &str) -> Vec<f64> {
        log::warn!("'name2mass_list' is deprecated, use 'name_to_masses'");
        self.name_to_masses(name)
    }

    /// Use [`Self::name_to_first_mass`]
    #[deprecated(note = "use `name_to_first_mass`")]
    pub fn name2first_mass(&self, name: &str) -> Option<f64> {
        log::warn!("'name2first_mass' is deprecated, use 'name_to_first_mass'");
        self.name_to_first_mass(name)
    }

    /// Use [`Self::name_to_compositions`]
    #[deprecated(note = "use `name_to_compositions`")]
    pub fn name2composition_list(&self, name: &str) -> Vec<&Composition> {
        log::warn!("'name2composition_list' is deprecated, use 'name_to_compositions'");
        self.name_to_compositions(name)
    }

    /// Use [`Self::name_to_first_composition`]
    #[deprecated(note = "use `name_to_first_composition`")]
    pub fn name2first_composition(&self, name: &str) -> Option<&Composition> {
        log::warn!("'name2first_composition' is deprecated, use 'name_to_first_composition'");
        self.name_to_first_composition(name)
    }

    /// Use [`Self::name_to_ids`]
    #[deprecated(note = "use `name_to_ids`")]
    pub fn name2id_list(&self, name: &str) -> Vec<&AccessionId> {
        log::warn!("'name2id_list' is deprecated, use 'name_to_ids'");
        self.name_to_ids(name)
    }

    /// Use [`Self::name_to_first_id`]
    #[deprecated(note = "use `name_to_first_id`")]
    pub fn name2first_id(&self, name: &str) -> Option<&AccessionId> {
        log::warn!("'name2first_id' is deprecated, use 'name_to_first_id'");
        self.name_to_first_id(name)
    }

    /// Use [`Self::name_to_specificities`]
    #[deprecated(note = "use `name_to_specificities`")]
    pub fn name2specificity_list(&self, name: &str) -> Vec<&[Specificity]> {
        log::warn!("'name2specificity_list' is deprecated, use 'name_to_specificities'");
        self.name_to_specificities(name)
    }

    /// Use [`Self::id_to_masses`]
    #[deprecated(note = "use `id_to_masses`")]
    pub fn id2mass_list(&self, id: impl Into<AccessionId>) -> Vec<f64> {
        log::warn!("'id2mass_list' is deprecated, use 'id_to_masses'");
        self.id_to_masses(id)
    }

    /// Use [`Self::id_to_first_mass`]
    #[deprecated(note = "use `id_to_first_mass`")]
    pub fn id2first_mass(&self, id: impl Into<AccessionId>) -> Option<f64> {
        log::warn!("'id2first_mass' is deprecated, use 'id_to_first_mass'");
        self.id_to_first_mass(id)
    }

    /// Use [`Self::id_to_compositions`]
    #[deprecated(note = "use `id_to_compositions`")]
    pub fn id2composition_list(&self, id: impl Into<AccessionId>) -> Vec<&Composition> {
        log::warn!("'id2composition_list' is deprecated, use 'id_to_compositions'");
        self.id_to_compositions(id)
    }

    /// Use [`Self::id_to_first_composition`]
    #[deprecated(note = "use `id_to_first_composition`")]
    pub fn id2first_composition(&self, id: impl Into<AccessionId>) -> Option<&Composition> {
        log::warn!("'id2first_composition' is deprecated, use 'id_to_first_composition'");
        self.id_to_first_composition(id)
    }

    /// Use [`Self::id_to_names`]
    #[deprecated(note = "use `id_to_names`")]
    pub fn id2name_list(&self, id: impl Into<AccessionId>) -> Vec<&str> {
        log::warn!("'id2name_list' is deprecated, use 'id_to_names'");
        self.id_to_names(id)
    }

    /// Use [`Self::id_to_first_name`]
    #[deprecated(note = "use `id_to_first_name`")]
    pub fn id2first_name(&self, id: impl Into<AccessionId>) -> Option<&str> {
        log::warn!("'id2first_name' is deprecated, use 'id_to_first_name'");
        self.id_to_first_name(id)
    }

    /// Use [`Self::mass_to_names`]
    #[deprecated(note = "use `mass_to_names`")]
    pub fn mass2name_list(&self, mass: f64) -> Vec<&str> {
        log::warn!("'mass2name_list' is deprecated, use 'mass_to_names'");
        self.mass_to_names(mass)
    }

    /// Use [`Self::mass_to_ids`]
    #[deprecated(note = "use `mass_to_ids`")]
    pub fn mass2id_list(&self, mass: f64) -> Vec<&AccessionId> {
        log::warn!("'mass2id_list' is deprecated, use 'mass_to_ids'");
        self.mass_to_ids(mass)
    }

    /// Use [`Self::mass_to_compositions`]
    #[deprecated(note = "use `mass_to_compositions`")]
    pub fn mass2composition_list(&self, mass: f64) -> Vec<&Composition> {
        log::warn!("'mass2composition_list' is deprecated, use 'mass_to_compositions'");
        self.mass_to_compositions(mass)
    }

    /// Use [`Self::approximate_mass_to_ids`]
    #[deprecated(note = "use `approximate_mass_to_ids`")]
    pub fn app_mass2id_list(&self, mass: f64, decimal_places: u8) -> Vec<&AccessionId> {
        log::warn!("'app_mass2id_list' is deprecated, use 'approximate_mass_to_ids'");
        self.approximate_mass_to_ids(mass, decimal_places)
    }

    /// Use [`Self::approximate_mass_to_names`]
    #[deprecated(note = "use `approximate_mass_to_names`")]
    pub fn app_mass2name_list(&self, mass: f64, decimal_places: u8) -> Vec<&str> {
        log::warn!("'app_mass2name_list' is deprecated, use 'approximate_mass_to_names'");
        self.approximate_mass_to_names(mass, decimal_places)
    }

    /// Use [`Self::approximate_mass_to_compositions`]
    #[deprecated(note = "use `approximate_mass_to_compositions`")]
    pub fn app_mass2element_list(&self, mass: f64, decimal_places: u8) -> Vec<&Composition> {
        log::warn!("'app_mass2element_list' is deprecated, use 'approximate_mass_to_compositions'");
        self.approximate_mass_to_compositions(mass, decimal_places)
    }

    /// Use [`Self::composition_to_names`]
    #[deprecated(note = "use `composition_to_names`")]
    pub fn composition2name_list(&self, composition: &str) -> Vec<&str> {
        log::warn!("'composition2name_list' is deprecated, use 'composition_to_names'");
        self.composition_to_names(composition)
    }

    /// Use [`Self::composition_to_ids`]
    #[deprecated(note = "use `composition_to_ids`")]
    pub fn composition2id_list(&self, composition: &str) -> Vec<&AccessionId> {
        log::warn!("'composition2id_list' is deprecated, use 'composition_to_ids'");
        self.composition_to_ids(composition)
    }

    /// Use [`Self::composition_to_mass`]
    /// # Errors
    /// If the composition maps to multiple masses.
    #[deprecated(note = "use `composition_to_mass`")]
    pub fn composition2mass(&self, composition: &str) -> Result<Option<f64>, MapperIssue> {
        log::warn!("'composition2mass' is deprecated, use 'composition_to_mass'");
        self.composition_to_mass(composition)
    }

    /// Use [`Self::write_user_record`]
    /// # Errors
    /// See [`Self::write_user_record`].
    #[deprecated(note = "use `write_user_record`")]
    pub fn write_xml(
        &mut self,
        modification: UserModification,
        xml_file: Option<&std::path::Path>,
    ) -> Result<AccessionId, MapperIssue> {
        log::warn!("'write_xml' is deprecated, use 'write_user_record'");
        self.write_user_record(modification, xml_file)
    }
}
