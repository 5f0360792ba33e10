//! Top-level metadata object types.
//!
//! Every object of an export tree carries exactly one [`ObjectType`]. The
//! type decides the XML tag used in the root descriptor's `ChildObjects`
//! list and in full names (`Catalog.Goods`), the directory the object's
//! files live in (`Catalogs/Goods.xml`), and whether the object may own
//! forms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

macro_rules! object_types {
    ($( $variant:ident => $tag:literal, $dir:literal, $forms:literal; )+) => {
        /// A top-level metadata object type.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ObjectType {
            $( $variant, )+
        }

        impl ObjectType {
            /// Every known type, in the order the platform lists them.
            pub const ALL: &'static [ObjectType] = &[ $( ObjectType::$variant, )+ ];

            /// The XML tag of the type (`Catalog`).
            pub fn tag(self) -> &'static str {
                match self {
                    $( ObjectType::$variant => $tag, )+
                }
            }

            /// The export sub-directory objects of this type are stored in.
            pub fn directory(self) -> &'static str {
                match self {
                    $( ObjectType::$variant => $dir, )+
                }
            }

            /// Whether objects of this type can own forms.
            pub fn supports_forms(self) -> bool {
                match self {
                    $( ObjectType::$variant => $forms, )+
                }
            }
        }

        impl FromStr for ObjectType {
            type Err = ModelError;

            fn from_str(tag: &str) -> Result<Self, Self::Err> {
                match tag {
                    $( $tag => Ok(ObjectType::$variant), )+
                    other => Err(ModelError::UnknownObjectType(other.to_string())),
                }
            }
        }
    };
}

object_types! {
    Language => "Language", "Languages", false;
    Subsystem => "Subsystem", "Subsystems", false;
    StyleItem => "StyleItem", "StyleItems", false;
    Style => "Style", "Styles", false;
    PaletteColor => "PaletteColor", "PaletteColors", false;
    Interface => "Interface", "Interfaces", false;
    CommonPicture => "CommonPicture", "CommonPictures", false;
    SessionParameter => "SessionParameter", "SessionParameters", false;
    Role => "Role", "Roles", false;
    CommonTemplate => "CommonTemplate", "CommonTemplates", false;
    FilterCriterion => "FilterCriterion", "FilterCriteria", true;
    CommonModule => "CommonModule", "CommonModules", false;
    CommonAttribute => "CommonAttribute", "CommonAttributes", false;
    ExchangePlan => "ExchangePlan", "ExchangePlans", true;
    XdtoPackage => "XDTOPackage", "XDTOPackages", false;
    WebService => "WebService", "WebServices", false;
    HttpService => "HTTPService", "HTTPServices", false;
    WsReference => "WSReference", "WSReferences", false;
    WebSocketClient => "WebSocketClient", "WebSocketClients", false;
    IntegrationService => "IntegrationService", "IntegrationServices", false;
    Bot => "Bot", "Bots", false;
    EventSubscription => "EventSubscription", "EventSubscriptions", false;
    ScheduledJob => "ScheduledJob", "ScheduledJobs", false;
    SettingsStorage => "SettingsStorage", "SettingsStorages", true;
    FunctionalOption => "FunctionalOption", "FunctionalOptions", false;
    FunctionalOptionsParameter => "FunctionalOptionsParameter", "FunctionalOptionsParameters", false;
    DefinedType => "DefinedType", "DefinedTypes", false;
    CommonCommand => "CommonCommand", "CommonCommands", false;
    CommandGroup => "CommandGroup", "CommandGroups", false;
    Constant => "Constant", "Constants", false;
    CommonForm => "CommonForm", "CommonForms", false;
    Catalog => "Catalog", "Catalogs", true;
    Document => "Document", "Documents", true;
    DocumentNumerator => "DocumentNumerator", "DocumentNumerators", false;
    Sequence => "Sequence", "Sequences", false;
    DocumentJournal => "DocumentJournal", "DocumentJournals", true;
    Enum => "Enum", "Enums", true;
    Report => "Report", "Reports", true;
    DataProcessor => "DataProcessor", "DataProcessors", true;
    InformationRegister => "InformationRegister", "InformationRegisters", true;
    AccumulationRegister => "AccumulationRegister", "AccumulationRegisters", true;
    ChartOfCharacteristicTypes => "ChartOfCharacteristicTypes", "ChartsOfCharacteristicTypes", true;
    ChartOfAccounts => "ChartOfAccounts", "ChartsOfAccounts", true;
    AccountingRegister => "AccountingRegister", "AccountingRegisters", true;
    ChartOfCalculationTypes => "ChartOfCalculationTypes", "ChartsOfCalculationTypes", true;
    CalculationRegister => "CalculationRegister", "CalculationRegisters", true;
    BusinessProcess => "BusinessProcess", "BusinessProcesses", true;
    Task => "Task", "Tasks", true;
    ExternalDataSource => "ExternalDataSource", "ExternalDataSources", true;
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for ty in ObjectType::ALL {
            assert_eq!(ty.tag().parse::<ObjectType>().unwrap(), *ty);
        }
    }

    #[test]
    fn newer_platform_types_are_known() {
        let cases = [
            ("ExternalDataSource", "ExternalDataSources"),
            ("Bot", "Bots"),
            ("IntegrationService", "IntegrationServices"),
            ("WebSocketClient", "WebSocketClients"),
            ("PaletteColor", "PaletteColors"),
            ("Interface", "Interfaces"),
        ];
        for (tag, dir) in cases {
            let ty: ObjectType = tag.parse().unwrap();
            assert!(ObjectType::ALL.contains(&ty));
            assert_eq!(ty.tag(), tag);
            assert_eq!(ty.directory(), dir);
        }
        assert!(ObjectType::ExternalDataSource.supports_forms());
        assert!(!ObjectType::Bot.supports_forms());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "Gadget".parse::<ObjectType>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownObjectType(tag) if tag == "Gadget"));
    }

    #[test]
    fn irregular_directories() {
        assert_eq!(ObjectType::FilterCriterion.directory(), "FilterCriteria");
        assert_eq!(ObjectType::ChartOfAccounts.directory(), "ChartsOfAccounts");
        assert_eq!(ObjectType::BusinessProcess.directory(), "BusinessProcesses");
        assert_eq!(ObjectType::XdtoPackage.tag(), "XDTOPackage");
    }

    #[test]
    fn form_support() {
        assert!(ObjectType::Catalog.supports_forms());
        assert!(ObjectType::DataProcessor.supports_forms());
        assert!(!ObjectType::Role.supports_forms());
        assert!(!ObjectType::CommonModule.supports_forms());
    }
}
