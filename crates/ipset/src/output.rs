//! Decoding of `ipset list -output xml`.
//!
//! The tool's XML carries set names as attributes and the type and members
//! as child elements (`<member><elem>..</elem></member>`). The flattened
//! attribute form (`<ipset type=".."><member elem=".."/>`) is accepted too.

use common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One set as reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetInfo {
    pub name: String,
    /// Type name as printed by the tool, e.g. `hash:ip`.
    pub set_type: String,
    /// Member elements in the order the tool listed them.
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IPSetsXml {
    #[serde(rename = "ipset", default)]
    sets: Vec<IPSetXml>,
}

#[derive(Debug, Deserialize)]
struct IPSetXml {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@type", default)]
    type_attr: Option<String>,
    #[serde(rename = "type", default)]
    type_elem: Option<String>,
    #[serde(default)]
    members: Option<MembersXml>,
}

#[derive(Debug, Deserialize)]
struct MembersXml {
    #[serde(rename = "member", default)]
    members: Vec<MemberXml>,
}

#[derive(Debug, Deserialize)]
struct MemberXml {
    #[serde(rename = "@elem", default)]
    elem_attr: Option<String>,
    #[serde(rename = "elem", default)]
    elem: Option<String>,
}

impl From<IPSetXml> for SetInfo {
    fn from(set: IPSetXml) -> Self {
        let members = set
            .members
            .map(|m| {
                m.members
                    .into_iter()
                    .filter_map(|member| member.elem_attr.or(member.elem))
                    .map(|elem| elem.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        SetInfo {
            name: set.name,
            set_type: set
                .type_attr
                .or(set.type_elem)
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            members,
        }
    }
}

/// Decode every set descriptor in `xml`.
pub fn decode_sets(xml: &str) -> Result<Vec<SetInfo>> {
    let decoded: IPSetsXml = quick_xml::de::from_str(xml).map_err(Error::decode)?;
    trace!(sets = decoded.sets.len(), "decoded ipset xml");
    Ok(decoded.sets.into_iter().map(SetInfo::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_attribute_form() {
        let xml = r#"<ipsets>
  <ipset name="testset" type="hash:ip">
    <members>
      <member elem="10.0.0.2"/>
      <member elem="10.0.0.1"/>
    </members>
  </ipset>
</ipsets>"#;

        let sets = decode_sets(xml).unwrap();
        assert_eq!(
            sets,
            vec![SetInfo {
                name: "testset".into(),
                set_type: "hash:ip".into(),
                members: vec!["10.0.0.2".into(), "10.0.0.1".into()],
            }]
        );
    }

    #[test]
    fn test_decode_tool_form() {
        let xml = r#"<ipsets>
<ipset name="testset">
<type>bitmap:ip</type>
<revision>3</revision>
<header>
<range>192.168.0.0-192.168.255.255</range>
<memsize>8280</memsize>
<references>0</references>
<numentries>2</numentries>
</header>
<members>
<member><elem>192.168.1.0</elem></member>
<member><elem>192.168.1.1</elem></member>
</members>
</ipset>
<ipset name="other">
<type>hash:net</type>
<members>
</members>
</ipset>
</ipsets>
"#;

        let sets = decode_sets(xml).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].set_type, "bitmap:ip");
        assert_eq!(sets[0].members, ["192.168.1.0", "192.168.1.1"]);
        assert_eq!(sets[1].name, "other");
        assert!(sets[1].members.is_empty());
    }

    #[test]
    fn test_decode_empty_document() {
        assert!(decode_sets("<ipsets></ipsets>").unwrap().is_empty());
        assert!(decode_sets("<ipsets/>").unwrap().is_empty());
    }

    #[test]
    fn test_decode_set_without_members() {
        let sets = decode_sets(r#"<ipsets><ipset name="a" type="list:set"/></ipsets>"#).unwrap();
        assert_eq!(sets[0].name, "a");
        assert!(sets[0].members.is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode_sets("<ipsets><ipset name=").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
