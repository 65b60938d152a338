//! Unity class IDs.

/// `GameObject` class ID.
pub const GAME_OBJECT: i32 = 1;
/// `TextAsset` class ID.
pub const TEXT_ASSET: i32 = 49;
/// `MonoBehaviour` class ID.
pub const MONO_BEHAVIOUR: i32 = 114;

/// Classes whose serialized data starts with the `m_Name` string.
const NAMED_CLASSES: [i32; 21] = [
    21, 28, 43, 48, 49, 74, 83, 84, 89, 90, 91, 115, 117, 128, 142, 152, 187, 213, 221, 329,
    687_078_895,
];

/// Gets the name of the class with the given ID, or `Class<ID>` if it is unknown.
pub fn class_name(id: i32) -> String {
    let name = match id {
        1 => "GameObject",
        2 => "Component",
        4 => "Transform",
        8 => "Behaviour",
        20 => "Camera",
        21 => "Material",
        23 => "MeshRenderer",
        25 => "Renderer",
        27 => "Texture",
        28 => "Texture2D",
        33 => "MeshFilter",
        43 => "Mesh",
        48 => "Shader",
        49 => "TextAsset",
        54 => "Rigidbody",
        64 => "MeshCollider",
        65 => "BoxCollider",
        74 => "AnimationClip",
        82 => "AudioSource",
        83 => "AudioClip",
        84 => "RenderTexture",
        89 => "Cubemap",
        90 => "Avatar",
        91 => "AnimatorController",
        95 => "Animator",
        108 => "Light",
        114 => "MonoBehaviour",
        115 => "MonoScript",
        117 => "Texture3D",
        128 => "Font",
        137 => "SkinnedMeshRenderer",
        142 => "AssetBundle",
        150 => "PreloadData",
        152 => "MovieClip",
        187 => "Texture2DArray",
        198 => "ParticleSystem",
        199 => "ParticleSystemRenderer",
        212 => "SpriteRenderer",
        213 => "Sprite",
        221 => "AnimatorOverrideController",
        222 => "CanvasRenderer",
        223 => "Canvas",
        224 => "RectTransform",
        329 => "VideoClip",
        687_078_895 => "SpriteAtlas",
        _ => return format!("Class{}", id),
    };
    name.to_owned()
}

/// Checks if objects of the class start with their name.
pub fn is_named(id: i32) -> bool {
    NAMED_CLASSES.contains(&id)
}
