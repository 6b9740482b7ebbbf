use crate::document::{
    DocumentKind, EnvironmentDocument, BUILD_ENV_NAME, DEV_ENV_NAME, LIBRARY_ENV_NAME,
};
use crate::translate::TranslatedGroups;

pub const DEV_TOOLS: [&str; 2] = ["conda-lock", "esbonio"];

/// The five layered documents, assembled before pip extras are added.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub build: EnvironmentDocument,
    pub optional_basic: EnvironmentDocument,
    pub library: EnvironmentDocument,
    pub library_optional: EnvironmentDocument,
    pub dev: EnvironmentDocument,
}

impl DocumentSet {
    pub fn get(&self, kind: DocumentKind) -> &EnvironmentDocument {
        match kind {
            DocumentKind::Build => &self.build,
            DocumentKind::OptionalBasic => &self.optional_basic,
            DocumentKind::Library => &self.library,
            DocumentKind::LibraryOptional => &self.library_optional,
            DocumentKind::Dev => &self.dev,
        }
    }

    pub fn get_mut(&mut self, kind: DocumentKind) -> &mut EnvironmentDocument {
        match kind {
            DocumentKind::Build => &mut self.build,
            DocumentKind::OptionalBasic => &mut self.optional_basic,
            DocumentKind::Library => &mut self.library,
            DocumentKind::LibraryOptional => &mut self.library_optional,
            DocumentKind::Dev => &mut self.dev,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentKind, &EnvironmentDocument)> {
        DocumentKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Layer the documents: build ⊂ library ⊂ library-optional, build ⊂
/// optional-basic, library ⊂ dev.
pub fn assemble_documents(groups: &TranslatedGroups) -> DocumentSet {
    let mut build = EnvironmentDocument::with_header(BUILD_ENV_NAME);
    build.dependencies(&groups.standard);
    build.comment("Packages needed for ./bootstrap");
    build.dependencies(&groups.bootstrap);

    let mut library = build.clone().renamed(BUILD_ENV_NAME, LIBRARY_ENV_NAME);
    library.comment("Additional packages providing all dependencies for the Sage library");
    library.dependencies(&groups.sagelib_standard);

    let mut optional_basic = build.clone();
    optional_basic.comment("optional packages");
    optional_basic.dependencies(&groups.optional);

    let mut library_optional = library.clone();
    library_optional.comment("optional packages");
    library_optional.dependencies(&groups.optional);
    library_optional.dependencies(&groups.sagelib_optional);

    let mut dev = library.clone().renamed(LIBRARY_ENV_NAME, DEV_ENV_NAME);
    dev.comment("Additional dev tools");
    for tool in DEV_TOOLS {
        dev.dependency(tool);
    }
    dev.dependencies(&groups.develop);

    DocumentSet {
        build,
        optional_basic,
        library,
        library_optional,
        dev,
    }
}
